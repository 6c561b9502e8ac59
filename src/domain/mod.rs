//! Domain layer for tj-request-rotator.
//!
//! Contains the canonical types shared across all modules:
//! - `SongRecord`: one song to recommend or propose
//! - `EgressPath` / `ProxyType`: the route a client is bound to
//! - `RotatorError`: Top-level error type

pub mod egress;
pub mod error;
pub mod song;

pub use egress::{EgressPath, ProxyType};
pub use error::RotatorError;
pub use song::{GENRE_CATALOG_CODES, SongRecord, catalog_code_for_genre};
