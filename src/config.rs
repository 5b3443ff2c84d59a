//! TOML configuration: input column names and export settings.
//!
//! Every field has a default matching the common brokerage export, so the
//! tool runs without any config file at all.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{HarvestError, Result};

const CONFIG_DIR: &str = "harvest";
const CONFIG_FILENAME: &str = "config.toml";
pub const CONFIG_ENV: &str = "HARVEST_CONFIG";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Field delimiter; detected from the header line when absent
    pub delimiter: Option<char>,
    pub columns: ColumnNames,
    pub export: ExportConfig,
}

/// Header names of the columns the planner reads
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnNames {
    pub symbol: String,
    pub name: String,
    pub market_value: String,
    pub gain_loss_abs: String,
    pub gain_loss_pct: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            symbol: "Symbol".to_string(),
            name: "Name".to_string(),
            market_value: "Market Value".to_string(),
            gain_loss_abs: "Gain/Loss($)".to_string(),
            gain_loss_pct: "Gain/Loss(%)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub file_name: PathBuf,
    /// Source columns left out of the exported table
    pub drop_columns: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: PathBuf::from("stocks.csv"),
            drop_columns: vec!["Day Change($)".to_string(), "Day Change(%)".to_string()],
        }
    }
}

impl Config {
    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| HarvestError::Config(e.message().to_string()))?;

        if let Some(delimiter) = config.delimiter {
            if !delimiter.is_ascii() {
                return Err(HarvestError::Config(format!(
                    "delimiter must be a single ASCII character, got '{}'",
                    delimiter
                ))
                .into());
            }
        }

        Ok(config)
    }

    /// Load the config from an explicit path, `HARVEST_CONFIG`, or the
    /// user config directory, falling back to defaults.
    ///
    /// An explicitly requested file must exist; the default location is
    /// optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        if let Some(path) = requested {
            return Self::load_file(&path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::load_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        info!("Loading config from {:?}", path);
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// The configured delimiter as a CSV byte
    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter.map(|c| c as u8)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
}
