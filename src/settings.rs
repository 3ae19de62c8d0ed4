use nback_experiment::ExperimentConfig;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Overrides the settings file location.
pub const SETTINGS_ENV: &str = "NBACK_SETTINGS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Persists the experiment configuration as JSON between runs
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// `$NBACK_SETTINGS`, else `<config dir>/nback/settings.json`.
    pub fn locate() -> Result<Self, SettingsError> {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return Ok(Self::at(path));
        }
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::at(dir.join("nback").join("settings.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields the defaults; stored values are clamped.
    pub fn load(&self) -> Result<ExperimentConfig, SettingsError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let stored: ExperimentConfig = serde_json::from_str(&text)?;
                if !stored.is_valid() {
                    warn!(path = %self.path.display(), ?stored, "stored settings out of range, clamping");
                }
                Ok(stored.clamped())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ExperimentConfig::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn load_or_default(&self) -> ExperimentConfig {
        match self.load() {
            Ok(config) => {
                debug!(path = %self.path.display(), ?config, "settings loaded");
                config
            }
            Err(e) => {
                warn!(path = %self.path.display(), "using default settings: {}", e);
                ExperimentConfig::default()
            }
        }
    }

    pub fn save(&self, config: &ExperimentConfig) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(config)?)?;
        Ok(())
    }
}
