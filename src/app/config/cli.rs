use super::{ConfigError, LogFormat, LogLevel, RunMode, SettingsDocument};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Settings document path (TOML when the extension is .toml, JSON otherwise)
    #[arg(
        long = "config",
        short = 'c',
        env = "ROTATOR_CONFIG",
        default_value = "setting.macro.json"
    )]
    pub config_file: PathBuf,

    /// Override the run mode from the settings document
    #[arg(long, env = "ROTATOR_MODE")]
    pub mode: Option<RunMode>,

    /// Override the Tor round count from the settings document
    #[arg(long, env = "ROTATOR_ROUNDS")]
    pub rounds: Option<u32>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", default_value = "compact")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from("setting.macro.json"),
            mode: None,
            rounds: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Compact,
        }
    }
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Config::try_parse_from(args).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }

    /// Read the settings document, then layer environment and command-line
    /// overrides on top and validate the result.
    pub fn load_settings(&self) -> Result<SettingsDocument, ConfigError> {
        let mut document = SettingsDocument::from_file(&self.config_file)?;
        document.apply_env_overrides()?;
        self.apply_overrides(&mut document);
        document.run.validate()?;
        Ok(document)
    }

    fn apply_overrides(&self, document: &mut SettingsDocument) {
        if let Some(mode) = self.mode {
            document.run.mode = mode;
        }
        if let Some(rounds) = self.rounds {
            document.run.rounds = rounds;
        }
    }
}
