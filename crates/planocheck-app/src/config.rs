//! Configuration management for planocheck
//!
//! Config stored at: ~/.config/planocheck/config.json

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use planocheck_types::{ConfigError, OutputFormat, Result};
use planocheck_vision::{DEFAULT_LOW_CONFIDENCE, DEFAULT_MIN_CONFIDENCE};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory override (stores, audits, images)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// External detector command line. Without it, sidecar JSON files are used.
    #[serde(default)]
    pub detector_command: Option<String>,

    /// Detections below this confidence are dropped
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Detections below this confidence are logged
    #[serde(default = "default_low_confidence")]
    pub low_confidence_threshold: f64,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_min_confidence() -> f64 {
    DEFAULT_MIN_CONFIDENCE
}

fn default_low_confidence() -> f64 {
    DEFAULT_LOW_CONFIDENCE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            detector_command: None,
            min_confidence: default_min_confidence(),
            low_confidence_threshold: default_low_confidence(),
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("planocheck");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("planocheck");
        Ok(data_dir)
    }

    /// Directory that receives copies of audited images
    pub fn images_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("images"))
    }

    /// Load config from the default location, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from `path`, or default if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_confidence", self.min_confidence),
            ("low_confidence_threshold", self.low_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be within 0.0-1.0, got {}",
                    name, value
                ))
                .into());
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Planocheck Configuration")?;
        writeln!(f, "========================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Data dir:         {}",
            self.data_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(
            f,
            "Detector:         {}",
            self.detector_command.as_deref().unwrap_or("(sidecar JSON)")
        )?;
        writeln!(f, "Min confidence:   {:.2}", self.min_confidence)?;
        writeln!(f, "Low confidence:   {:.2}", self.low_confidence_threshold)?;
        writeln!(f, "Output format:    {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:      {}", path.display())?;
        }

        Ok(())
    }
}
