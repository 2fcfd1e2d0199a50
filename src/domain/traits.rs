// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The training loop only sees these three traits:
//
//   Learner      — owns model, loss, optimizer and LR schedule;
//                  runs one batch in the requested mode
//   BatchSource  — a split: restartable batch sequence + size
//   ScalarSink   — where epoch metrics are written
//
// Implementations:
//   - ClassifierLearner (Layer 5)  → Learner over a Burn model
//   - SplitLoader       (Layer 4)  → BatchSource over a Burn DataLoader
//   - TensorboardSink / CsvSink / Fanout (Layer 6) → ScalarSink
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::metrics::BatchOutcome;
use crate::domain::phase::Mode;

// ─── Learner ──────────────────────────────────────────────────────────────────
/// Something that can be trained one batch at a time.
///
/// Training and validation batches are separate associated types
/// because validation usually runs without gradient tracking,
/// on a different tensor backend than training.
pub trait Learner {
    type TrainBatch;
    type ValidBatch;

    /// Switch between training-enabled and training-disabled.
    /// Called once at the start of every phase.
    fn set_mode(&mut self, mode: Mode);

    /// Forward, loss, backward and one optimizer update.
    fn train_step(&mut self, batch: Self::TrainBatch) -> Result<BatchOutcome>;

    /// Forward and loss only. Must leave parameters untouched.
    fn valid_step(&self, batch: Self::ValidBatch) -> Result<BatchOutcome>;

    /// Advance the learning-rate schedule by one epoch.
    fn step_schedule(&mut self);

    /// Learning rate the next optimizer update will use.
    fn learning_rate(&self) -> f64;
}

// ─── BatchSource ──────────────────────────────────────────────────────────────
/// One data split.
///
/// Each call to `batches()` starts a fresh, independent traversal;
/// a shuffled split reshuffles every time.
pub trait BatchSource<T> {
    fn batches(&self) -> Box<dyn Iterator<Item = T> + '_>;

    /// Total number of samples across all batches of one traversal
    fn sample_count(&self) -> usize;
}

// ─── ScalarSink ───────────────────────────────────────────────────────────────
/// Write-only destination for named scalar series.
pub trait ScalarSink {
    /// Record `value` at position `epoch` of the series `tag`
    fn add_scalar(&mut self, tag: &str, value: f64, epoch: usize) -> Result<()>;

    /// Flush everything. Called exactly once, after the last epoch.
    fn close(&mut self) -> Result<()>;
}
