// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Failures that callers may want to tell apart. Everything is
// fatal for the run; the enum only exists so the message is
// precise and tests can match on the variant after an
// anyhow::Error has been downcast.
//
// Reference: thiserror crate documentation
//            Rust Book §9 (Error Handling)

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::phase::Phase;

#[derive(Error, Debug)]
pub enum TrainError {
    /// A required configuration key was neither in the file nor on the CLI
    #[error("missing required configuration key '{0}'")]
    MissingKey(&'static str),

    /// Device string did not match any known device
    #[error("invalid device '{0}' (expected auto, cpu, gpu[:N], cuda[:N], integrated[:N] or virtual[:N])")]
    InvalidDevice(String),

    /// A numeric setting was outside its valid range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `<root>/<split>` does not exist or is not a directory
    #[error("split directory not found: {0}")]
    MissingSplit(PathBuf),

    /// A split contains no images at all
    #[error("split '{split}' contains no images under {root}")]
    EmptySplit { split: String, root: PathBuf },

    /// Train and val disagree on the set of class folders
    #[error("class folders differ between train ({train:?}) and val ({val:?})")]
    ClassMismatch { train: Vec<String>, val: Vec<String> },

    /// An image file could not be opened or decoded
    #[error("cannot read image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },

    /// A phase produced zero batches, so its mean loss is undefined
    #[error("{0} phase yielded no batches; check the data source")]
    EmptyPhase(Phase),

    /// The learner was asked to evaluate without being put in eval mode
    #[error("validation step requested while the model is in training mode")]
    NotInEvalMode,
}
