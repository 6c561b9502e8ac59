use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Transport type requested from the proxy list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ProxyType {
    #[default]
    Socks,
    Http,
}

impl ProxyType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProxyType::Socks => "SOCKS",
            ProxyType::Http => "HTTP",
        }
    }

    /// URL scheme used when binding a client to a proxy of this type.
    pub fn scheme(self) -> &'static str {
        match self {
            ProxyType::Http => "http",
            ProxyType::Socks => "socks5",
        }
    }
}

impl FromStr for ProxyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SOCKS" | "SOCKS5" => Ok(ProxyType::Socks),
            "HTTP" => Ok(ProxyType::Http),
            other => Err(format!(
                "Invalid proxy type: {other}. Valid values: SOCKS, HTTP"
            )),
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProxyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProxyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The network route a client instance is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EgressPath {
    Direct,
    /// `host:port` of an HTTP proxy.
    HttpProxy(String),
    /// `host:port` of a SOCKS5 proxy.
    SocksProxy(String),
    /// Local Tor SOCKS listener.
    TorSocks { host: String, port: u16 },
}

impl EgressPath {
    /// Build an egress path from a proxy-list endpoint. Any scheme already on
    /// the endpoint is replaced by the one implied by `proxy_type`.
    pub fn from_candidate(endpoint: &str, proxy_type: ProxyType) -> Self {
        let hostport = endpoint
            .split_once("://")
            .map_or(endpoint, |(_, rest)| rest)
            .trim()
            .trim_end_matches('/')
            .to_string();
        match proxy_type {
            ProxyType::Http => EgressPath::HttpProxy(hostport),
            ProxyType::Socks => EgressPath::SocksProxy(hostport),
        }
    }

    pub fn tor(host: impl Into<String>, port: u16) -> Self {
        EgressPath::TorSocks {
            host: host.into(),
            port,
        }
    }

    /// Proxy URL for the HTTP client, `None` for a direct route.
    ///
    /// Tor uses `socks5h` so hostnames resolve inside the circuit.
    pub fn proxy_url(&self) -> Option<String> {
        match self {
            EgressPath::Direct => None,
            EgressPath::HttpProxy(hostport) => Some(format!("http://{hostport}")),
            EgressPath::SocksProxy(hostport) => Some(format!("socks5://{hostport}")),
            EgressPath::TorSocks { host, port } => Some(format!("socks5h://{host}:{port}")),
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, EgressPath::Direct)
    }
}

impl fmt::Display for EgressPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.proxy_url() {
            Some(url) => f.write_str(&url),
            None => f.write_str("direct"),
        }
    }
}
