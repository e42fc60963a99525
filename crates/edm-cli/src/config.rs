//! Run configuration, read from a TOML file passed with `--config`.
//!
//! Every section and field has a default, so an empty file (or no file)
//! reproduces the standard analysis over `./data`.

use anyhow::{Context, Result};
use edm_metrics::{AnalysisOptions, ProjectionParams};
use edm_report::DisplayPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EdmConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub display: DisplayPolicy,
    #[serde(default)]
    pub analysis: AnalysisOptions,
    #[serde(default)]
    pub projection: ProjectionParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory the dataset CSV files are read from
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Computed tables are exported here when set
    #[serde(default)]
    pub export_dir: Option<String>,
    /// Per-dataset file names replacing the defaults, keyed by dataset
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            export_dir: None,
            files: BTreeMap::new(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

/// Parse a configuration file. `None` gives the defaults.
pub fn load_config(path: Option<&Path>) -> Result<EdmConfig> {
    let Some(path) = path else {
        return Ok(EdmConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: EdmConfig =
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))?;
    config
        .projection
        .validate()
        .with_context(|| format!("invalid [projection] in {}", path.display()))?;
    Ok(config)
}
