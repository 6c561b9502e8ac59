use super::serde_helpers::null_as_default;
use crate::domain::{EgressPath, ProxyType};
use crate::reliability::{DelayRange, RetryPolicy};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which egress rotation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// One direct session, one pass over the songs
    #[default]
    None,
    /// Every song through every selected public proxy
    Proxy,
    /// Rounds over the local Tor relay, new circuit per round
    Tor,
    /// Proxy pass, then Tor rounds
    All,
    /// Unrecognized mode string; runs like `none`
    #[serde(other)]
    #[value(skip)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxySettings {
    #[serde(rename = "type")]
    pub proxy_type: ProxyType,
    /// Number of candidates to use; 0 means all of them.
    pub limit: usize,
    pub source_url: String,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            proxy_type: ProxyType::Socks,
            limit: 20,
            source_url: "https://api.proxyscrape.com/v4/free-proxy-list/get?request=display_proxies&proxy_format=ipport&format=json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TorSettings {
    pub manage_service: bool,
    pub service_name: String,
    pub socks_host: String,
    pub socks_port: u16,
    pub wait_port_sec: u64,
}

impl Default for TorSettings {
    fn default() -> Self {
        Self {
            manage_service: true,
            service_name: "tor".to_string(),
            socks_host: "127.0.0.1".to_string(),
            socks_port: 9050,
            wait_port_sec: 60,
        }
    }
}

impl TorSettings {
    pub fn egress(&self) -> EgressPath {
        EgressPath::tor(self.socks_host.clone(), self.socks_port)
    }

    pub fn wait_port(&self) -> Duration {
        Duration::from_secs(self.wait_port_sec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogSettings {
    pub base_url: String,
    /// Request board listing matching songs.
    pub search_path: String,
    pub recommend_path: String,
    /// Request form page carrying the already-requested marker.
    pub request_status_path: String,
    pub propose_path: String,
    pub user_agent: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.tjmedia.com".to_string(),
            search_path: "/tjsong/song_songRequestEnd_b.asp".to_string(),
            recommend_path: "/tjsong/song_songRequestEnd_save.asp".to_string(),
            request_status_path: "/tjsong/song_songRequestEnd_a.asp".to_string(),
            propose_path: "/tjsong/song_songRequest_save.asp".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/102.0.0.0 Safari/537.36".to_string(),
        }
    }
}

/// Options for one run. Loaded once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunSettings {
    #[serde(deserialize_with = "null_as_default")]
    pub mode: RunMode,
    pub proxy: ProxySettings,
    /// Tor circuit count; 0 behaves like 1.
    pub rounds: u32,
    pub timeout_sec: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub delay_ms: DelayRange,
    pub allow_propose_if_not_found: bool,
    pub tor: TorSettings,
    pub catalog: CatalogSettings,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            mode: RunMode::None,
            proxy: ProxySettings::default(),
            rounds: 1,
            timeout_sec: 7,
            retries: 1,
            retry_delay_ms: 400,
            delay_ms: DelayRange::default(),
            allow_propose_if_not_found: true,
            tor: TorSettings::default(),
            catalog: CatalogSettings::default(),
        }
    }
}

impl RunSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn effective_rounds(&self) -> u32 {
        self.rounds.max(1)
    }
}
