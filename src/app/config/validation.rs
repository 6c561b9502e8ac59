use super::{ConfigError, RunSettings};
use url::Url;

impl RunSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate catalog URL
        Url::parse(&self.catalog.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid catalog base URL '{}': {}",
                self.catalog.base_url, e
            ))
        })?;

        // Validate proxy source URL
        Url::parse(&self.proxy.source_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid proxy source URL '{}': {}",
                self.proxy.source_url, e
            ))
        })?;

        // Validate timeouts
        if self.timeout_sec == 0 {
            return Err(ConfigError::InvalidConfig(
                "timeoutSec must be greater than 0".to_string(),
            ));
        }

        // Validate relay endpoint
        if self.tor.socks_port == 0 {
            return Err(ConfigError::InvalidConfig(
                "tor.socksPort must be greater than 0".to_string(),
            ));
        }
        if self.tor.service_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "tor.serviceName must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
