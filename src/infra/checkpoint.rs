// ============================================================
// Layer 6 — Checkpoint Writer
// ============================================================
// Persists the final model weights with Burn's CompactRecorder.
//
// What gets saved at the end of a run:
//   1. Model weights (<path>.mpk)    — all learned parameters
//   2. train_config.json             — the resolved run config,
//                                      next to the weights
//
// The path is fixed per configuration and overwritten on every
// run; there is no versioning and no resume.
//
// Burn's CompactRecorder:
//   - Stores floats at half precision
//   - Serialises model parameters to named MessagePack
//   - Picks the file extension itself; weights_file() asks it
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, FileRecorder, Recorder},
};
use std::{
    fs,
    path::PathBuf,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::SimpleConv3;

pub const CONFIG_FILE: &str = "train_config.json";

pub struct CheckpointWriter {
    /// Weights path without extension; the recorder adds its own
    path: PathBuf,
}

impl CheckpointWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the recorder actually writes
    pub fn weights_file<B: Backend>(&self) -> PathBuf {
        self.path
            .with_extension(<CompactRecorder as FileRecorder<B>>::file_extension())
    }

    pub fn config_file(&self) -> PathBuf {
        self.path.with_file_name(CONFIG_FILE)
    }

    /// Save model weights, replacing any previous checkpoint.
    pub fn save_model<B: Backend>(&self, model: &SimpleConv3<B>) -> Result<()> {
        self.ensure_parent()?;

        CompactRecorder::new()
            .record(model.clone().into_record(), self.path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", self.path.display())
            })?;

        tracing::info!("Saved checkpoint: '{}'", self.weights_file::<B>().display());
        Ok(())
    }

    /// Save the resolved training configuration next to the weights.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.ensure_parent()?;
        let path = self.config_file();

        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        }
        Ok(())
    }
}
