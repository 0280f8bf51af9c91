//! Application configuration management.
//!
//! Configuration is stored at `~/.config/scoutstats/config.json`. The data
//! directory can be overridden with `SCOUTSTATS_DATA_DIR` (a `.env` file is
//! honored by the binary).

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::models::Measure;

/// Application name used for the config directory path
const APP_NAME: &str = "scoutstats";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding `data_dir`
pub const DATA_DIR_ENV: &str = "SCOUTSTATS_DATA_DIR";

/// Data directory used when nothing else is configured
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub default_year: Option<i32>,
    /// Force a CSV delimiter instead of detecting it per file.
    pub delimiter: Option<char>,
    #[serde(default)]
    pub measure: Measure,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Ok(serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `SCOUTSTATS_DATA_DIR` if it is set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// The delimiter as a CSV byte, if one is configured and ASCII.
    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter
            .filter(|c| c.is_ascii())
            .map(|c| c as u8)
    }

    /// Year range for the line chart, clamped to the years present in the data.
    ///
    /// Without data the range collapses to the current calendar year.
    pub fn year_range(&self, available: &[i32]) -> (i32, i32) {
        let current = chrono::Local::now().year();
        let first = available.iter().min().copied().unwrap_or(current);
        let last = available.iter().max().copied().unwrap_or(current);
        let from = self.year_from.unwrap_or(first).max(first);
        let to = self.year_to.unwrap_or(last).min(last);
        if from > to {
            (first, last)
        } else {
            (from, to)
        }
    }

    /// The configured year if it is present in the data, else the latest one.
    pub fn selected_year(&self, available: &[i32]) -> Option<i32> {
        match self.default_year {
            Some(year) if available.contains(&year) => Some(year),
            _ => available.iter().max().copied(),
        }
    }
}
