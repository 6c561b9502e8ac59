use std::future::Future;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Checks whether something accepts TCP connections on a port.
pub trait PortProbe {
    fn is_listening(
        &self,
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> impl Future<Output = bool> + Send;
}

/// Short-timeout TCP connect probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpPortProbe;

impl PortProbe for TcpPortProbe {
    async fn is_listening(&self, host: &str, port: u16, connect_timeout: Duration) -> bool {
        matches!(
            timeout(connect_timeout, TcpStream::connect((host, port))).await,
            Ok(Ok(_))
        )
    }
}
