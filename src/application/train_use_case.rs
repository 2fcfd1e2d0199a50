// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run in order:
//
//   Step 1: Resolve the compute device     (Layer 5 - ml)
//   Step 2: Load train/val image folders   (Layer 4 - data)
//   Step 3: Build datasets and loaders     (Layer 4 - data)
//   Step 4: Build model, SGD, StepLR       (Layer 5 - ml)
//   Step 5: Open the metrics sinks         (Layer 6 - infra)
//   Step 6: Run the epoch loop             (Layer 5 - ml)
//   Step 7: Save config and checkpoint     (Layer 6 - infra)
//
// Configuration precedence, lowest to highest:
//   built-in defaults < config.yaml < command-line flags
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::{
    backend::{Autodiff, Wgpu},
    optim::{momentum::MomentumConfig, SgdConfig},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::data::{
    batcher::ImageBatch,
    dataset::ImageDataset,
    image_folder::{ensure_same_classes, ImageFolder},
    split::{LoaderOptions, SplitLoader},
    transform::Transform,
};
use crate::domain::{error::TrainError, phase::Phase, traits::BatchSource};
use crate::infra::{
    checkpoint::CheckpointWriter,
    config::ConfigFile,
    metrics::{CsvSink, Fanout, TensorboardSink},
};
use crate::ml::{
    device::DeviceSpec,
    learner::ClassifierLearner,
    model::{SimpleConv3, SimpleConv3Config},
    scheduler::StepLr,
    trainer::train_model,
};

/// Smallest crop the three stride-2 convolutions can reduce to a 1×1 map
const MIN_CROP: usize = 15;

// ─── Training Configuration ──────────────────────────────────────────────────
// The fully resolved settings for one run. Saved as JSON next to
// the checkpoint so a run can be inspected afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub device:          Option<String>,
    pub epochs:          usize,
    pub data_dir:        String,
    pub batch_size:      usize,
    pub num_workers:     usize,
    pub image_size:      usize,
    pub crop_size:       usize,
    pub lr:              f64,
    pub momentum:        f64,
    pub step_size:       usize,
    pub gamma:           f64,
    pub dropout:         f64,
    pub seed:            u64,
    pub checkpoint_path: String,
    pub log_dir:         String,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            device:          None,
            epochs:          300,
            data_dir:        "data".to_string(),
            batch_size:      64,
            num_workers:     4,
            image_size:      64,
            crop_size:       48,
            lr:              0.1,
            momentum:        0.9,
            step_size:       100,
            gamma:           0.1,
            dropout:         0.0,
            seed:            42,
            checkpoint_path: "checkpoints/model".to_string(),
            log_dir:         "logs".to_string(),
        }
    }
}

/// Values given on the command line; each one beats the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub epochs:          Option<usize>,
    pub device:          Option<String>,
    pub data_dir:        Option<String>,
    pub log_dir:         Option<String>,
    pub checkpoint_path: Option<String>,
}

impl TrainConfig {
    /// Merge defaults, file values and CLI overrides, then validate.
    pub fn resolve(file: ConfigFile, cli: ConfigOverrides) -> Result<Self, TrainError> {
        let d = Self::default();

        let epochs = cli
            .epochs
            .or(file.epochs)
            .ok_or(TrainError::MissingKey("epochs"))?;

        let cfg = Self {
            device:          cli.device.or(file.device),
            epochs,
            data_dir:        cli.data_dir.or(file.data_dir).unwrap_or(d.data_dir),
            batch_size:      file.batch_size.unwrap_or(d.batch_size),
            num_workers:     file.num_workers.unwrap_or(d.num_workers),
            image_size:      file.image_size.unwrap_or(d.image_size),
            crop_size:       file.crop_size.unwrap_or(d.crop_size),
            lr:              file.lr.unwrap_or(d.lr),
            momentum:        file.momentum.unwrap_or(d.momentum),
            step_size:       file.step_size.unwrap_or(d.step_size),
            gamma:           file.gamma.unwrap_or(d.gamma),
            dropout:         file.dropout.unwrap_or(d.dropout),
            seed:            file.seed.unwrap_or(d.seed),
            checkpoint_path: cli.checkpoint_path.or(file.checkpoint_path).unwrap_or(d.checkpoint_path),
            log_dir:         cli.log_dir.or(file.log_dir).unwrap_or(d.log_dir),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings that would fail later, before any data is read.
    pub fn validate(&self) -> Result<(), TrainError> {
        let invalid = |msg: String| Err(TrainError::InvalidConfig(msg));

        DeviceSpec::from_setting(self.device.as_deref())?;

        if self.batch_size == 0 {
            return invalid("batch_size must be at least 1".into());
        }
        if self.crop_size < MIN_CROP {
            return invalid(format!("crop_size must be at least {MIN_CROP}, got {}", self.crop_size));
        }
        if self.image_size < self.crop_size {
            return invalid(format!(
                "image_size ({}) must not be smaller than crop_size ({})",
                self.image_size, self.crop_size
            ));
        }
        if self.step_size == 0 {
            return invalid("step_size must be at least 1".into());
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return invalid(format!("lr must be a positive number, got {}", self.lr));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return invalid(format!("dropout must be in [0, 1), got {}", self.dropout));
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

/// What a finished run produced
#[derive(Debug)]
pub struct TrainOutcome {
    pub classes:      Vec<String>,
    pub weights_file: PathBuf,
    pub log_dir:      PathBuf,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train on the configured wgpu device
    pub fn execute(&self) -> Result<TrainOutcome> {
        // ── Step 1: Resolve the device ────────────────────────────────────────
        let spec   = DeviceSpec::from_setting(self.config.device.as_deref())?;
        let device = spec.to_wgpu();
        tracing::info!("Using device {:?}", device);

        self.execute_on::<Autodiff<Wgpu>>(device)
    }

    /// Same pipeline on any autodiff backend
    pub fn execute_on<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainOutcome> {
        let cfg = &self.config;
        B::seed(cfg.seed);

        // ── Step 2: Load image folders ────────────────────────────────────────
        let train_folder = ImageFolder::open(&cfg.data_dir, Phase::Train.split_name())?;
        let val_folder   = ImageFolder::open(&cfg.data_dir, Phase::Val.split_name())?;
        ensure_same_classes(&train_folder, &val_folder)?;

        let classes = train_folder.classes().to_vec();
        for folder in [&train_folder, &val_folder] {
            tracing::info!(
                "{}: {} images, per class {:?}",
                folder.split(),
                folder.len(),
                folder.class_counts()
            );
        }
        tracing::info!("Classes (label order): {:?}", classes);

        // ── Step 3: Datasets and loaders ──────────────────────────────────────
        let crop  = cfg.crop_size as u32;
        let train = ImageDataset::new(train_folder.into_samples(), Transform::train(crop));
        let val   = ImageDataset::new(
            val_folder.into_samples(),
            Transform::val(cfg.image_size as u32, crop),
        );

        // Val batches live on the inner backend, matching the frozen
        // model the learner evaluates with.
        let train_loader = SplitLoader::<ImageBatch<B>>::new(
            Phase::Train.split_name(),
            train,
            device.clone(),
            LoaderOptions {
                batch_size:  cfg.batch_size,
                num_workers: cfg.num_workers,
                shuffle:     Some(cfg.seed),
            },
        );
        let val_loader = SplitLoader::<ImageBatch<B::InnerBackend>>::new(
            Phase::Val.split_name(),
            val,
            device.clone(),
            LoaderOptions {
                batch_size:  cfg.batch_size,
                num_workers: cfg.num_workers,
                shuffle:     None,
            },
        );

        for (name, samples) in [
            (train_loader.name(), train_loader.sample_count()),
            (val_loader.name(), val_loader.sample_count()),
        ] {
            tracing::debug!("Loader '{}' ready with {} samples", name, samples);
        }

        // ── Step 4: Model, optimizer, schedule ────────────────────────────────
        let model: SimpleConv3<B> = SimpleConv3Config::new(classes.len())
            .with_input_size(cfg.crop_size)
            .with_dropout(cfg.dropout)
            .init(&device);

        let optim = SgdConfig::new()
            .with_momentum(Some(
                MomentumConfig::new()
                    .with_momentum(cfg.momentum)
                    .with_dampening(0.0),
            ))
            .init::<B, SimpleConv3<B>>();

        let schedule = StepLr::new(cfg.lr, cfg.step_size, cfg.gamma);
        let learner  = ClassifierLearner::new(model, optim, schedule);

        // ── Step 5: Metrics sinks ─────────────────────────────────────────────
        let mut sink = Fanout::new()
            .with(TensorboardSink::new(&cfg.log_dir)?)
            .with(CsvSink::new(&cfg.log_dir)?);

        // ── Step 6: Epoch loop ────────────────────────────────────────────────
        let learner = train_model(learner, &train_loader, &val_loader, &mut sink, cfg.epochs)
            .context("Training failed")?;

        // ── Step 7: Persist ───────────────────────────────────────────────────
        let writer = CheckpointWriter::new(&cfg.checkpoint_path);
        writer.save_config(cfg)?;
        writer.save_model(learner.model())?;

        Ok(TrainOutcome {
            classes,
            weights_file: writer.weights_file::<B>(),
            log_dir:      PathBuf::from(&cfg.log_dir),
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::{fs, path::Path};

    use crate::data::image_folder::tests::write_png;
    use crate::infra::{checkpoint::CONFIG_FILE, metrics::CsvSink};

    fn file_with_epochs(epochs: usize) -> ConfigFile {
        ConfigFile { epochs: Some(epochs), ..ConfigFile::default() }
    }

    #[test]
    fn test_missing_epochs_is_reported() {
        let err = TrainConfig::resolve(ConfigFile::default(), ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, TrainError::MissingKey("epochs")));
    }

    #[test]
    fn test_cli_beats_file_beats_default() {
        let file = ConfigFile {
            epochs:   Some(300),
            device:   Some("cpu".into()),
            log_dir:  Some("from-file".into()),
            lr:       Some(0.05),
            ..ConfigFile::default()
        };
        let cli = ConfigOverrides {
            epochs: Some(2),
            log_dir: Some("from-cli".into()),
            ..ConfigOverrides::default()
        };

        let cfg = TrainConfig::resolve(file, cli).unwrap();
        assert_eq!(cfg.epochs, 2);
        assert_eq!(cfg.log_dir, "from-cli");
        assert_eq!(cfg.device.as_deref(), Some("cpu"));
        assert_eq!(cfg.lr, 0.05);
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.checkpoint_path, "checkpoints/model");
    }

    #[test]
    fn test_bad_device_fails_before_training() {
        let file = ConfigFile { device: Some("tpu:0".into()), ..file_with_epochs(1) };
        let err  = TrainConfig::resolve(file, ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, TrainError::InvalidDevice(_)));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        for file in [
            ConfigFile { batch_size: Some(0), ..file_with_epochs(1) },
            ConfigFile { crop_size: Some(8), ..file_with_epochs(1) },
            ConfigFile { image_size: Some(32), crop_size: Some(48), ..file_with_epochs(1) },
            ConfigFile { step_size: Some(0), ..file_with_epochs(1) },
            ConfigFile { dropout: Some(1.0), ..file_with_epochs(1) },
        ] {
            let err = TrainConfig::resolve(file, ConfigOverrides::default()).unwrap_err();
            assert!(matches!(err, TrainError::InvalidConfig(_)), "{err}");
        }
    }

    fn small_dataset(root: &Path) {
        for split in ["train", "val"] {
            write_png(root, split, "dark",  "0.png", [10, 10, 10]);
            write_png(root, split, "dark",  "1.png", [20, 20, 20]);
            write_png(root, split, "light", "0.png", [240, 240, 240]);
            write_png(root, split, "light", "1.png", [250, 250, 250]);
        }
    }

    fn small_config(root: &Path, epochs: usize) -> TrainConfig {
        TrainConfig {
            epochs,
            data_dir:        root.join("data").display().to_string(),
            batch_size:      2,
            num_workers:     0,
            image_size:      20,
            crop_size:       16,
            checkpoint_path: root.join("checkpoints/model").display().to_string(),
            log_dir:         root.join("logs").display().to_string(),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_end_to_end_run_writes_everything() {
        let tmp = tempfile::tempdir().unwrap();
        small_dataset(&tmp.path().join("data"));
        let cfg = small_config(tmp.path(), 2);

        let outcome = TrainUseCase::new(cfg.clone())
            .execute_on::<Autodiff<NdArray>>(Default::default())
            .unwrap();

        assert_eq!(outcome.classes, vec!["dark".to_string(), "light".to_string()]);
        assert_eq!(outcome.weights_file, tmp.path().join("checkpoints/model.mpk"));
        assert!(outcome.weights_file.is_file());

        let events = fs::read_dir(&outcome.log_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("events.out.tfevents"))
            .count();
        assert_eq!(events, 1);

        let saved = fs::read_to_string(tmp.path().join("checkpoints").join(CONFIG_FILE)).unwrap();
        let saved: TrainConfig = serde_json::from_str(&saved).unwrap();
        assert_eq!(saved, cfg);

        // header + 4 series × 2 epochs
        let csv = fs::read_to_string(outcome.log_dir.join(CsvSink::FILE_NAME)).unwrap();
        assert_eq!(csv.lines().count(), 1 + 4 * 2);
        assert!(csv.lines().any(|l| l.starts_with("1,data/valacc,")));
    }

    #[test]
    fn test_missing_val_split_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write_png(&tmp.path().join("data"), "train", "dark", "0.png", [0, 0, 0]);
        let cfg = small_config(tmp.path(), 1);

        let err = TrainUseCase::new(cfg)
            .execute_on::<Autodiff<NdArray>>(Default::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrainError>(),
            Some(TrainError::MissingSplit(_))
        ));
        assert!(!tmp.path().join("checkpoints").exists());
    }
}
