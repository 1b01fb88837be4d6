use crate::error::Result;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_PATH: &str = "data/pokedex.csv";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV file loaded at startup.
    pub data_path: PathBuf,
    /// How many types (from the sorted list) the multi-select starts with.
    pub default_type_count: usize,
    /// Statistic the mean chart starts with, if the dataset has it.
    pub default_statistic: String,
    /// Size of the top-N chart.
    pub top_n: usize,
    /// Rows per page of the data table.
    pub page_size: usize,
    /// Fixed bin count for histograms; `None` picks one from the data.
    pub histogram_bins: Option<usize>,
    pub theme: Theme,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            default_type_count: 3,
            default_statistic: "HP".to_owned(),
            top_n: 10,
            page_size: 10,
            histogram_bins: None,
            theme: Theme::Light,
        }
    }
}

pub fn get_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pokedash")
        .join("config.json")
}

/// Loads the configuration at the standard path, falling back to defaults.
pub fn load_config() -> DashboardConfig {
    load_config_from(&get_config_path())
}

/// Loads the configuration at `path`. A missing or unreadable file yields the
/// defaults.
pub fn load_config_from(path: &Path) -> DashboardConfig {
    if path.exists() {
        match std::fs::read_to_string(path)
            .map_err(crate::error::DashboardError::from)
            .and_then(|content| Ok(serde_json::from_str::<DashboardConfig>(&content)?))
        {
            Ok(config) => return config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
            }
        }
    }
    DashboardConfig::default()
}

pub fn save_config_to(config: &DashboardConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Writes `config` to `path` unless a file is already there. Returns whether
/// it wrote.
pub fn write_if_missing(config: &DashboardConfig, path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config_to(config, path)?;
    tracing::info!(path = %path.display(), "Wrote default config");
    Ok(true)
}
