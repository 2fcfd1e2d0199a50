// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Drives epochs × phases over any Learner:
//
//   for epoch in 0..epochs
//     for phase in [Train, Val]
//       set mode → fold every batch into PhaseTotals
//       → epoch loss / accuracy → metrics sink
//     advance LR schedule
//   close sink
//
// Only the Train phase updates parameters. The loop itself
// holds no Burn types; ClassifierLearner (learner.rs) is the
// Burn-backed implementation used by the application layer.
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;

use crate::domain::{
    metrics::{BatchOutcome, EpochMetrics, PhaseTotals},
    phase::Phase,
    traits::{BatchSource, Learner, ScalarSink},
};

/// Run `epochs` full train/val epochs and hand the learner back.
///
/// The sink is closed exactly once, after the last epoch, even
/// when `epochs` is zero. Any error from a step, an empty phase,
/// or the sink aborts the run immediately.
pub fn train_model<L: Learner>(
    mut learner: L,
    train:       &dyn BatchSource<L::TrainBatch>,
    val:         &dyn BatchSource<L::ValidBatch>,
    sink:        &mut dyn ScalarSink,
    epochs:      usize,
) -> Result<L> {
    for epoch in 0..epochs {
        println!("Epoch {}/{}", epoch, epochs - 1);
        tracing::debug!("Epoch {} learning rate: {}", epoch, learner.learning_rate());

        for phase in Phase::ORDER {
            learner.set_mode(phase.mode());

            let metrics = match phase {
                Phase::Train => run_phase(epoch, phase, train, |b| learner.train_step(b))?,
                Phase::Val   => run_phase(epoch, phase, val,   |b| learner.valid_step(b))?,
            };

            sink.add_scalar(&phase.loss_tag(), metrics.loss,     epoch)?;
            sink.add_scalar(&phase.acc_tag(),  metrics.accuracy, epoch)?;

            println!("{} Loss: {:.4} Acc: {:.4}", phase, metrics.loss, metrics.accuracy);
        }

        learner.step_schedule();
    }

    sink.close()?;
    tracing::info!("Training complete after {} epochs", epochs);
    Ok(learner)
}

/// One full pass over a split.
fn run_phase<T>(
    epoch:    usize,
    phase:    Phase,
    source:   &dyn BatchSource<T>,
    mut step: impl FnMut(T) -> Result<BatchOutcome>,
) -> Result<EpochMetrics> {
    let mut totals = PhaseTotals::new();

    for batch in source.batches() {
        let outcome = step(batch)?;
        if !outcome.loss.is_finite() {
            tracing::warn!(
                "Non-finite {} loss ({}) at epoch {}, batch {}",
                phase, outcome.loss, epoch, totals.batches()
            );
        }
        totals.record(outcome);
    }

    let metrics = totals.finish(epoch, phase, source.sample_count())?;
    tracing::debug!(
        "{} epoch {}: {} batches, {} samples",
        metrics.phase, metrics.epoch, metrics.batches, metrics.samples
    );
    Ok(metrics)
}
