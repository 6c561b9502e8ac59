pub mod jitter;
pub mod readiness;
pub mod retry;

pub use jitter::DelayRange;
pub use readiness::{PROBE_INTERVAL, PROBE_TIMEOUT, Readiness, RelayState, wait_for_port};
pub use retry::RetryPolicy;
