pub mod config;
pub mod logging_system;

pub use config::{Config, ConfigError, LogFormat, LogLevel, RunMode, RunSettings, SettingsDocument};
pub use logging_system::{LoggingError, LoggingSystem, setup_logging};

use crate::catalog::HttpCatalogConnector;
use crate::domain::{RotatorError, SongRecord};
use crate::egress::{ProxyScrapeProvider, SystemServiceController, TcpPortProbe};
use crate::runner::{Orchestrator, RunSummary};
use clap::Parser;
use std::process;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

type ProductionOrchestrator =
    Orchestrator<HttpCatalogConnector, ProxyScrapeProvider, SystemServiceController, TcpPortProbe>;

pub struct App {
    orchestrator: ProductionOrchestrator,
    songs: Vec<SongRecord>,
}

impl App {
    pub fn from_args<I, T>(args: I) -> Result<Self, RotatorError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Config::from_args(args)?;
        setup_logging(config.log_level, config.log_format)?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Result<Self, RotatorError> {
        info!(
            path = %config.config_file.display(),
            "Loading settings"
        );
        let document = config.load_settings()?;
        Self::from_document(document)
    }

    pub fn from_document(document: SettingsDocument) -> Result<Self, RotatorError> {
        let SettingsDocument { run, songs } = document;

        let connector = HttpCatalogConnector::new(&run.catalog, run.timeout())
            .map_err(|e| ConfigError::InvalidConfig(format!("catalog client: {e}")))?;
        let proxies = ProxyScrapeProvider::new(&run.proxy.source_url, run.timeout())
            .map_err(|e| ConfigError::InvalidConfig(format!("proxy list: {e}")))?;

        info!(
            mode = ?run.mode,
            songs = songs.len(),
            timeout_sec = run.timeout_sec,
            retries = run.retries,
            "Settings loaded"
        );

        let orchestrator = Orchestrator::new(
            run,
            connector,
            proxies,
            SystemServiceController::detect(),
            TcpPortProbe,
        );
        Ok(Self {
            orchestrator,
            songs,
        })
    }

    pub fn settings(&self) -> &RunSettings {
        self.orchestrator.settings()
    }

    pub async fn run(self) -> RunSummary {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        self.orchestrator.run(&self.songs).instrument(span).await
    }
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Main entry point for the application
pub async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // clap prints help, version and usage errors and exits on its own
    let config = Config::parse();
    setup_logging(config.log_level, config.log_format)?;

    let app = match App::from_config(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    info!("Starting tj-request-rotator v{}", get_version());
    let summary = app.run().await;
    match summary.failure {
        None => {
            info!(passes = summary.reports.len(), "tj-request-rotator finished");
            Ok(())
        }
        Some(e) => {
            error!(
                completed_passes = summary.reports.len(),
                "Run aborted: {}", e
            );
            process::exit(1);
        }
    }
}
