// ============================================================
// Layer 6 — Metrics Sinks
// ============================================================
// Writes the per-epoch scalars reported by the training loop.
//
//   TensorboardSink — event files in the log directory, open
//                     with `tensorboard --logdir logs`
//   CsvSink         — logs/scalars.csv, one row per scalar:
//                       epoch,tag,value
//                       0,data/trainloss,1.386294
//                       0,data/trainacc,0.250000
//                       …
//   Fanout          — sends every scalar to several sinks
//
// Series written by the loop:
//   data/trainloss  data/trainacc  data/valloss  data/valacc
//
// Both files are written incrementally during the run and
// finalized when the loop calls close() after the last epoch.
//
// tensorboard-rs appends events from a background thread; a
// flush() only queues a signal for it. Dropping the writer is
// what joins that thread, so close() drops it and the event
// file is complete once close() returns.
//
// Reference: tensorboard-rs crate documentation
//            Rust Book §12 (I/O and File Handling)

use anyhow::{bail, Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tensorboard_rs::summary_writer::SummaryWriter;

use crate::domain::traits::ScalarSink;

// ─── TensorboardSink ──────────────────────────────────────────────────────────
pub struct TensorboardSink {
    /// `None` once closed
    writer: Option<SummaryWriter>,
    logdir: PathBuf,
}

impl TensorboardSink {
    /// Create the log directory (if needed) and open a new event file in it
    pub fn new(logdir: impl AsRef<Path>) -> Result<Self> {
        let logdir = logdir.as_ref().to_path_buf();
        fs::create_dir_all(&logdir)
            .with_context(|| format!("Cannot create log directory '{}'", logdir.display()))?;

        let writer = SummaryWriter::new(&logdir);
        tracing::debug!("TensorBoard event file opened in '{}'", logdir.display());
        Ok(Self { writer: Some(writer), logdir })
    }

    fn writer(&mut self) -> Result<&mut SummaryWriter> {
        match self.writer.as_mut() {
            Some(w) => Ok(w),
            None    => bail!("TensorBoard sink for '{}' is already closed", self.logdir.display()),
        }
    }
}

impl ScalarSink for TensorboardSink {
    fn add_scalar(&mut self, tag: &str, value: f64, epoch: usize) -> Result<()> {
        let writer = self.writer()?;
        writer.add_scalar(tag, value as f32, epoch);
        writer.flush();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let writer = self.writer()?;
        writer.flush();
        // Joins the background thread that owns the event file
        self.writer = None;
        tracing::info!("TensorBoard logs written to '{}'", self.logdir.display());
        Ok(())
    }
}

// ─── CsvSink ──────────────────────────────────────────────────────────────────
pub struct CsvSink {
    csv_path: PathBuf,
    out:      BufWriter<File>,
}

impl CsvSink {
    pub const FILE_NAME: &'static str = "scalars.csv";

    /// Start a fresh `scalars.csv` in `dir`, replacing any previous run's file
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create log directory '{}'", dir.display()))?;

        let csv_path = dir.join(Self::FILE_NAME);
        let file = File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;

        let mut out = BufWriter::new(file);
        writeln!(out, "epoch,tag,value")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path, out })
    }
}

impl ScalarSink for CsvSink {
    fn add_scalar(&mut self, tag: &str, value: f64, epoch: usize) -> Result<()> {
        writeln!(self.out, "{},{},{:.6}", epoch, tag, value)
            .with_context(|| format!("Cannot append to '{}'", self.csv_path.display()))?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.out
            .flush()
            .with_context(|| format!("Cannot flush '{}'", self.csv_path.display()))?;
        Ok(())
    }
}

// ─── Fanout ───────────────────────────────────────────────────────────────────
/// Forwards every call to each inner sink, in order; the first error wins.
#[derive(Default)]
pub struct Fanout {
    sinks: Vec<Box<dyn ScalarSink>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl ScalarSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl ScalarSink for Fanout {
    fn add_scalar(&mut self, tag: &str, value: f64, epoch: usize) -> Result<()> {
        for sink in &mut self.sinks {
            sink.add_scalar(tag, value, epoch)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.close()?;
        }
        Ok(())
    }
}
