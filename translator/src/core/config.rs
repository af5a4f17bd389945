use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::traces::ServiceNameDataset;
use crate::domain::traces::dataset::UNKNOWN_SERVICE_DATASET;
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{APP_DOT_FOLDER, CONFIG_FILE_NAME};

// =============================================================================
// File Configuration
// =============================================================================

/// Dataset routing section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatasetFileConfig {
    pub default: Option<String>,
    pub unknown: Option<String>,
}

/// Output section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OutputFileConfig {
    pub pretty: Option<bool>,
    pub events: Option<bool>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub dataset: Option<DatasetFileConfig>,
    pub output: Option<OutputFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(dataset) = other.dataset {
            let current = self.dataset.get_or_insert_with(DatasetFileConfig::default);
            if dataset.default.is_some() {
                tracing::trace!(default = ?dataset.default, "Merging dataset.default");
                current.default = dataset.default;
            }
            if dataset.unknown.is_some() {
                tracing::trace!(unknown = ?dataset.unknown, "Merging dataset.unknown");
                current.unknown = dataset.unknown;
            }
        }

        if let Some(output) = other.output {
            let current = self.output.get_or_insert_with(OutputFileConfig::default);
            if output.pretty.is_some() {
                tracing::trace!(pretty = ?output.pretty, "Merging output.pretty");
                current.pretty = output.pretty;
            }
            if output.events.is_some() {
                tracing::trace!(events = ?output.events, "Merging output.events");
                current.events = output.events;
            }
        }
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    /// Dataset every batch is routed to, overriding `service.name`
    pub default: Option<String>,
    /// Dataset for resources without a usable `service.name`
    pub unknown: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub pretty: bool,
    /// Include events, or print batch summaries only
    pub events: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.tracefold/tracefold.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        Self::load_with_profile(cli, get_profile_config_path())
    }

    fn load_with_profile(cli: &CliConfig, profile_path: Option<PathBuf>) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Profile dir, skipped when absent
        if let Some(profile_path) = profile_path
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        // 3. Layer: defaults -> file config -> CLI/env overrides
        let file_dataset = file_config.dataset.unwrap_or_default();
        let file_output = file_config.output.unwrap_or_default();

        let default_dataset = cli
            .dataset
            .clone()
            .or(file_dataset.default)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let unknown_dataset = file_dataset
            .unknown
            .map(|d| d.trim().to_string())
            .unwrap_or_else(|| UNKNOWN_SERVICE_DATASET.to_string());

        // Flags can only switch on; the file sets the baseline
        let pretty = cli.pretty || file_output.pretty.unwrap_or(false);
        let events = if cli.summary {
            false
        } else {
            file_output.events.unwrap_or(true)
        };

        let config = Self {
            dataset: DatasetConfig {
                default: default_dataset,
                unknown: unknown_dataset,
            },
            output: OutputConfig { pretty, events },
        };

        config.validate()?;
        tracing::debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.dataset.unknown.is_empty() {
            anyhow::bail!("Configuration error: dataset.unknown must not be empty");
        }
        Ok(())
    }

    /// Dataset policy routing resources without a service name to
    /// `dataset.unknown`.
    pub fn dataset_policy(&self) -> ServiceNameDataset {
        ServiceNameDataset::new(self.dataset.unknown.clone())
    }
}

/// Get the profile config path (~/.tracefold/tracefold.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
