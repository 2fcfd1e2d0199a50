// ============================================================
// Layer 3 — Phase Metrics
// ============================================================
// Each batch reports a BatchOutcome (its scalar loss and how
// many predictions hit the label). PhaseTotals folds those
// into running sums and turns them into EpochMetrics once the
// phase is done.
//
// The two averages are deliberately different:
//   loss     = sum of batch losses / number of batches
//   accuracy = correct predictions / samples in the split
//
// So a short final batch weighs as much as a full one in the
// loss, but accuracy is an exact per-sample fraction.

use crate::domain::error::TrainError;
use crate::domain::phase::Phase;

/// What one forward pass over one batch produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOutcome {
    /// Scalar loss of the batch (already reduced over the batch)
    pub loss: f64,
    /// Number of samples whose argmax prediction equals the label
    pub correct: usize,
}

/// Running sums for one phase of one epoch
#[derive(Debug, Default, Clone)]
pub struct PhaseTotals {
    loss_sum: f64,
    correct:  usize,
    batches:  usize,
}

impl PhaseTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: BatchOutcome) {
        self.loss_sum += outcome.loss;
        self.correct  += outcome.correct;
        self.batches  += 1;
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Close the phase.
    ///
    /// Fails with `TrainError::EmptyPhase` when no batch was seen
    /// or the split is empty, instead of producing NaN.
    pub fn finish(
        self,
        epoch:        usize,
        phase:        Phase,
        sample_count: usize,
    ) -> Result<EpochMetrics, TrainError> {
        if self.batches == 0 || sample_count == 0 {
            return Err(TrainError::EmptyPhase(phase));
        }

        Ok(EpochMetrics {
            epoch,
            phase,
            loss:     self.loss_sum / self.batches as f64,
            accuracy: self.correct as f64 / sample_count as f64,
            batches:  self.batches,
            samples:  sample_count,
        })
    }
}

/// Aggregated result of one phase of one epoch
#[derive(Debug, Clone)]
pub struct EpochMetrics {
    /// Zero-based epoch index
    pub epoch:    usize,
    pub phase:    Phase,
    /// Mean of the per-batch losses
    pub loss:     f64,
    /// Correct predictions divided by the split's sample count
    pub accuracy: f64,
    pub batches:  usize,
    pub samples:  usize,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(loss: f64, correct: usize) -> BatchOutcome {
        BatchOutcome { loss, correct }
    }

    #[test]
    fn test_loss_is_mean_per_batch() {
        // Two batches of very different sizes still weigh equally
        let mut totals = PhaseTotals::new();
        totals.record(outcome(0.8, 60));
        totals.record(outcome(0.4, 1));

        let m = totals.finish(0, Phase::Train, 65).unwrap();
        assert!((m.loss - 0.6).abs() < 1e-12);
        assert_eq!(m.batches, 2);
    }

    #[test]
    fn test_accuracy_is_per_sample() {
        let mut totals = PhaseTotals::new();
        totals.record(outcome(1.0, 4));
        totals.record(outcome(1.0, 3));

        let m = totals.finish(3, Phase::Val, 10).unwrap();
        assert_eq!(m.accuracy, 0.7);
        assert_eq!(m.epoch, 3);
        assert_eq!(m.samples, 10);
    }

    #[test]
    fn test_accuracy_stays_in_unit_interval() {
        let mut totals = PhaseTotals::new();
        for _ in 0..5 {
            totals.record(outcome(0.1, 2));
        }
        let m = totals.finish(0, Phase::Val, 10).unwrap();
        assert!((0.0..=1.0).contains(&m.accuracy));
        assert_eq!(m.accuracy, 1.0);
    }

    #[test]
    fn test_empty_phase_is_an_error() {
        let totals = PhaseTotals::new();
        let err = totals.finish(0, Phase::Train, 0).unwrap_err();
        assert!(matches!(err, TrainError::EmptyPhase(Phase::Train)));
    }

    #[test]
    fn test_batches_without_samples_is_an_error() {
        let mut totals = PhaseTotals::new();
        totals.record(outcome(0.5, 0));
        assert!(totals.finish(0, Phase::Val, 0).is_err());
    }
}
