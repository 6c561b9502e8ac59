#![deny(rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Millisecond values fit comfortably in u64
    clippy::cast_precision_loss,      // Acceptable for quality scores
    clippy::missing_errors_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. ClientError in catalog::client
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

pub mod app;
pub mod catalog;
pub mod domain;
pub mod egress;
pub mod reliability;
pub mod runner;

// Re-export main types for easy access
pub use app::{App, Config};
pub use domain::{EgressPath, RotatorError, SongRecord};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
