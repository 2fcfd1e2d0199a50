// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and hands off to Layer 2.
//
//   simpleconv-trainer train [--config PATH] [--epochs N]
//                            [--device D] [--data-dir DIR]
//                            [--log-dir DIR] [--checkpoint PATH]
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, TrainArgs};

use crate::application::train_use_case::{TrainConfig, TrainUseCase};
use crate::infra::config::ConfigFile;

#[derive(Parser, Debug)]
#[command(
    name = "simpleconv-trainer",
    version = "0.1.0",
    about = "Train a small convolutional image classifier on a train/val folder tree."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let file   = ConfigFile::discover(args.config.as_deref())?;
    let config = TrainConfig::resolve(file, (&args).into())?;

    tracing::info!(
        "Training for {} epochs on '{}' (batch_size={}, lr={})",
        config.epochs, config.data_dir, config.batch_size, config.lr
    );

    let outcome = TrainUseCase::new(config).execute()?;

    println!(
        "Training complete. Checkpoint saved to {}",
        outcome.weights_file.display()
    );
    println!("Metrics written to {}", outcome.log_dir.display());
    println!("Class labels: {}", outcome.classes.join(", "));
    Ok(())
}
