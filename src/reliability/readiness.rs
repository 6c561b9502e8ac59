use crate::egress::PortProbe;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Interval between SOCKS port checks.
pub const PROBE_INTERVAL: Duration = Duration::from_secs(1);

/// Connect timeout of a single port check.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Observed state of the local relay service.
///
/// `NotStarted -> Starting -> (Ready | TimedOut)`, and on every later round
/// `Ready | TimedOut -> Starting` again after a restart. No state is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    NotStarted,
    Starting,
    Ready,
    TimedOut,
}

impl RelayState {
    pub fn after_wait(readiness: Readiness) -> Self {
        match readiness {
            Readiness::Ready => RelayState::Ready,
            Readiness::TimedOut => RelayState::TimedOut,
        }
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelayState::NotStarted => "not_started",
            RelayState::Starting => "starting",
            RelayState::Ready => "ready",
            RelayState::TimedOut => "timed_out",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    TimedOut,
}

/// Poll `host:port` every `interval` until it accepts connections or
/// `max_wait` has been spent waiting.
pub async fn wait_for_port<P: PortProbe>(
    probe: &P,
    host: &str,
    port: u16,
    max_wait: Duration,
    interval: Duration,
) -> Readiness {
    info!(
        host,
        port,
        max_wait_secs = max_wait.as_secs(),
        "Waiting for relay SOCKS port"
    );

    let mut waited = Duration::ZERO;
    while waited < max_wait {
        if probe.is_listening(host, port, PROBE_TIMEOUT).await {
            info!(host, port, waited_secs = waited.as_secs(), "Relay SOCKS port open");
            return Readiness::Ready;
        }
        tokio::time::sleep(interval).await;
        waited += interval;
    }

    warn!(
        host,
        port,
        max_wait_secs = max_wait.as_secs(),
        "Relay SOCKS port did not open in time"
    );
    Readiness::TimedOut
}
