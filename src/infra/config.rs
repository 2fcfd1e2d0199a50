// ============================================================
// Layer 6 — Configuration File
// ============================================================
// Reads run parameters from a YAML file. Every key is optional
// at this level; the application layer decides which ones are
// required (`epochs`) and fills the rest with defaults.
//
// Example config.yaml:
//
//   device: cuda:0        # optional, probed automatically if absent
//   epochs: 300           # required (here or via --epochs)
//   data_dir: ./data
//   batch_size: 64
//
// Unknown keys are rejected so typos fail at startup instead of
// being silently ignored.
//
// Reference: serde_yaml crate documentation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Looked up in the working directory when no --config is given
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub device:          Option<String>,
    pub epochs:          Option<usize>,
    pub data_dir:        Option<String>,
    pub batch_size:      Option<usize>,
    pub num_workers:     Option<usize>,
    pub image_size:      Option<usize>,
    pub crop_size:       Option<usize>,
    pub lr:              Option<f64>,
    pub momentum:        Option<f64>,
    pub step_size:       Option<usize>,
    pub gamma:           Option<f64>,
    pub dropout:         Option<f64>,
    pub seed:            Option<u64>,
    pub checkpoint_path: Option<String>,
    pub log_dir:         Option<String>,
}

impl ConfigFile {
    /// Parse YAML text; an empty document means "no settings"
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("Failed to parse YAML config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file '{}'", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    /// Load the explicit path if given (it must exist), otherwise
    /// `config.yaml` when present, otherwise an empty config.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.is_file() {
                    Self::load(default)
                } else {
                    tracing::warn!(
                        "No '{}' found; relying on command-line settings",
                        DEFAULT_CONFIG_PATH
                    );
                    Ok(Self::default())
                }
            }
        }
    }
}
