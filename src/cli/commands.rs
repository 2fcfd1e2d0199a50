// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the `train` subcommand and its flags. Every flag is
// optional: an absent flag falls back to config.yaml, then to
// the built-in default.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::ConfigOverrides;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the image classifier on a train/val folder tree
    Train(TrainArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// YAML config file (defaults to ./config.yaml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of epochs; required here or in the config file
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Compute device: auto, cpu, gpu[:N], cuda[:N], integrated[:N], virtual[:N]
    #[arg(long)]
    pub device: Option<String>,

    /// Dataset root containing train/ and val/
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Directory for TensorBoard events and scalars.csv
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Checkpoint path without extension
    #[arg(long = "checkpoint")]
    pub checkpoint_path: Option<String>,
}

/// The application layer never sees clap types.
impl From<&TrainArgs> for ConfigOverrides {
    fn from(a: &TrainArgs) -> Self {
        ConfigOverrides {
            epochs:          a.epochs,
            device:          a.device.clone(),
            data_dir:        a.data_dir.clone(),
            log_dir:         a.log_dir.clone(),
            checkpoint_path: a.checkpoint_path.clone(),
        }
    }
}
