//! Egress providers: where requests leave from.
//!
//! - `proxy_list`: ranked public proxy candidates
//! - `relay`: local Tor service control per platform
//! - `probe`: TCP readiness check for the relay's SOCKS port

pub mod probe;
pub mod proxy_list;
pub mod relay;

pub use probe::{PortProbe, TcpPortProbe};
pub use proxy_list::{
    ProxyCandidate, ProxyListError, ProxyListProvider, ProxyScrapeProvider, parse_candidates,
};
pub use relay::{
    CommandOutput, CommandRunner, PlatformFamily, RelayServiceController, ServiceAction,
    SystemCommandRunner, SystemServiceController,
};
