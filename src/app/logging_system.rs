use super::config::{LogFormat, LogLevel};
use std::sync::{Mutex, Once};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },
    #[error("Failed to set global tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Transport crates that are too chatty below `warn`.
const DEFAULT_DIRECTIVES: &[&str] = &["hyper=warn", "reqwest=warn", "h2=warn", "rustls=warn"];

pub struct LoggingSystem {
    level: LogLevel,
    format: LogFormat,
    directives: Vec<String>,
}

impl LoggingSystem {
    pub fn new(level: LogLevel, format: LogFormat) -> Self {
        Self {
            level,
            format,
            directives: DEFAULT_DIRECTIVES.iter().map(|d| (*d).to_string()).collect(),
        }
    }

    pub fn add_directive(&mut self, directive: impl Into<String>) {
        self.directives.push(directive.into());
    }

    pub fn directive_count(&self) -> usize {
        self.directives.len()
    }

    pub fn build_filter_string(&self) -> String {
        let base = tracing::Level::from(self.level).as_str().to_ascii_lowercase();
        std::iter::once(base)
            .chain(self.directives.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn build_filter(&self) -> Result<EnvFilter, LoggingError> {
        let filter = self.build_filter_string();
        EnvFilter::try_new(&filter).map_err(|e| LoggingError::InvalidFilter {
            filter,
            message: e.to_string(),
        })
    }

    pub fn initialize(&self) -> Result<(), LoggingError> {
        let filter = self.build_filter()?;
        let registry = tracing_subscriber::registry().with(filter);

        let result = match self.format {
            LogFormat::Compact => tracing::subscriber::set_global_default(
                registry.with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .compact(),
                ),
            ),
            LogFormat::Json => tracing::subscriber::set_global_default(
                registry.with(fmt::layer().with_target(true).json()),
            ),
        };

        result.map_err(|e| LoggingError::SubscriberInit(e.to_string()))
    }
}

/// Install the global subscriber once. Later calls return the first outcome.
pub fn setup_logging(level: LogLevel, format: LogFormat) -> Result<(), LoggingError> {
    static INIT: Once = Once::new();
    static INIT_RESULT: Mutex<Option<String>> = Mutex::new(None);

    INIT.call_once(|| {
        if let Err(e) = LoggingSystem::new(level, format).initialize() {
            if let Ok(mut slot) = INIT_RESULT.lock() {
                *slot = Some(e.to_string());
            }
        }
    });

    match INIT_RESULT.lock() {
        Ok(slot) => match slot.as_ref() {
            Some(message) => Err(LoggingError::SubscriberInit(message.clone())),
            None => Ok(()),
        },
        Err(_) => Err(LoggingError::SubscriberInit(
            "logging state lock poisoned".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        let logging = LoggingSystem::new(LogLevel::Info, LogFormat::Compact);
        assert_eq!(logging.directive_count(), 4);
        assert_eq!(
            logging.build_filter_string(),
            "info,hyper=warn,reqwest=warn,h2=warn,rustls=warn"
        );
    }

    #[test]
    fn test_extra_directive_and_level() {
        let mut logging = LoggingSystem::new(LogLevel::Debug, LogFormat::Json);
        logging.add_directive("tj_request_rotator::egress=trace");

        let filter = logging.build_filter_string();
        assert!(filter.starts_with("debug,"));
        assert!(filter.ends_with("tj_request_rotator::egress=trace"));
        assert!(logging.build_filter().is_ok());
    }

    #[test]
    fn test_setup_logging_is_idempotent() {
        let first = setup_logging(LogLevel::Warn, LogFormat::Compact);
        let second = setup_logging(LogLevel::Trace, LogFormat::Json);
        assert_eq!(first.is_ok(), second.is_ok());
    }
}
