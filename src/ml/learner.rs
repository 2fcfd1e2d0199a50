// ============================================================
// Layer 5 — Classifier Learner
// ============================================================
// Burn implementation of the Learner trait for SimpleConv3.
//
// Key Burn insight (same as for any AutodiffBackend model):
//   - Training runs on B (Autodiff<…>) so loss.backward() works
//   - model.valid() returns the model on B::InnerBackend,
//     which has no autodiff graph at all — validation cannot
//     touch parameters
//   - argmax(1) returns [batch, 1]; flatten before .equal()
//
// Per training batch:
//   logits = model.forward(images, Mode::Train)
//   loss   = CrossEntropy(logits, targets)
//   grads  = loss.backward()            (fresh every step, nothing to zero)
//   model  = optim.step(lr, model, grads)
//
// Reference: Burn Book §5 (Custom training loop)

use anyhow::Result;
use burn::{
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::ImageBatch;
use crate::domain::{
    error::TrainError,
    metrics::BatchOutcome,
    phase::Mode,
    traits::Learner,
};
use crate::ml::model::SimpleConv3;
use crate::ml::scheduler::StepLr;

pub struct ClassifierLearner<B, O>
where
    B: AutodiffBackend,
{
    model:    SimpleConv3<B>,
    optim:    O,
    schedule: StepLr,
    mode:     Mode,
    /// Snapshot of the model on the inner backend, present in eval mode only
    frozen:   Option<SimpleConv3<B::InnerBackend>>,
}

impl<B, O> ClassifierLearner<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<SimpleConv3<B>, B>,
{
    pub fn new(model: SimpleConv3<B>, optim: O, schedule: StepLr) -> Self {
        Self { model, optim, schedule, mode: Mode::Train, frozen: None }
    }

    pub fn model(&self) -> &SimpleConv3<B> {
        &self.model
    }
}

impl<B, O> Learner for ClassifierLearner<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<SimpleConv3<B>, B>,
{
    type TrainBatch = ImageBatch<B>;
    type ValidBatch = ImageBatch<B::InnerBackend>;

    fn set_mode(&mut self, mode: Mode) {
        self.mode   = mode;
        self.frozen = match mode {
            Mode::Train => None,
            Mode::Eval  => Some(self.model.valid()),
        };
    }

    fn train_step(&mut self, batch: ImageBatch<B>) -> Result<BatchOutcome> {
        debug_assert!(self.mode.is_train());

        let logits = self.model.forward(batch.images, Mode::Train);
        let loss   = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), batch.targets.clone());

        let correct  = count_correct(logits, batch.targets);
        let loss_val = loss.clone().into_scalar().elem::<f64>();

        // Backward pass + SGD update
        let grads  = GradientsParams::from_grads(loss.backward(), &self.model);
        self.model = self.optim.step(self.schedule.lr(), self.model.clone(), grads);

        Ok(BatchOutcome { loss: loss_val, correct })
    }

    fn valid_step(&self, batch: ImageBatch<B::InnerBackend>) -> Result<BatchOutcome> {
        let model  = self.frozen.as_ref().ok_or(TrainError::NotInEvalMode)?;
        let logits = model.forward(batch.images, Mode::Eval);
        let loss   = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), batch.targets.clone());

        Ok(BatchOutcome {
            loss:    loss.into_scalar().elem::<f64>(),
            correct: count_correct(logits, batch.targets),
        })
    }

    fn step_schedule(&mut self) {
        self.schedule.step();
        tracing::debug!(
            "LR schedule at epoch {}: lr={}",
            self.schedule.epoch(),
            self.schedule.lr()
        );
    }

    fn learning_rate(&self) -> f64 {
        self.schedule.lr()
    }
}

/// Number of rows whose argmax equals the target class.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns shape [batch, 1] — squeeze to [batch]
    let preds = logits.argmax(1).flatten::<1>(0, 1);
    preds
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use burn::{
        backend::{Autodiff, NdArray},
        module::{ModuleVisitor, ParamId},
        optim::{momentum::MomentumConfig, SgdConfig},
    };

    use crate::ml::model::SimpleConv3Config;

    pub(crate) type TestBackend = Autodiff<NdArray>;
    pub(crate) type InnerBackend = NdArray;

    pub(crate) fn batch<Bk: Backend>(device: &Bk::Device, n: usize) -> ImageBatch<Bk> {
        let pixels: Vec<f32> = (0..n * 3 * 48 * 48)
            .map(|i| ((i % 97) as f32 / 97.0) - 0.5)
            .collect();
        let labels: Vec<i64> = (0..n).map(|i| (i % 4) as i64).collect();
        ImageBatch {
            images:  Tensor::from_data(TensorData::new(pixels, [n, 3, 48, 48]), device),
            targets: Tensor::from_data(TensorData::new(labels, [n]), device),
        }
    }

    pub(crate) fn learner() -> ClassifierLearner<TestBackend, impl Optimizer<SimpleConv3<TestBackend>, TestBackend>> {
        let device = Default::default();
        let model: SimpleConv3<TestBackend> = SimpleConv3Config::new(4).init(&device);
        let optim = SgdConfig::new()
            .with_momentum(Some(MomentumConfig::new().with_momentum(0.9).with_dampening(0.0)))
            .init::<TestBackend, SimpleConv3<TestBackend>>();
        ClassifierLearner::new(model, optim, StepLr::new(0.1, 100, 0.1))
    }

    fn head_weights(l: &ClassifierLearner<TestBackend, impl Optimizer<SimpleConv3<TestBackend>, TestBackend>>) -> Vec<f32> {
        let head = &l.model().fc3;
        let mut params = head.weight.val().into_data().to_vec::<f32>().unwrap();
        if let Some(bias) = &head.bias {
            params.extend(bias.val().into_data().to_vec::<f32>().unwrap());
        }
        params
    }

    /// Every float tensor of the model, weights and batch-norm running
    /// statistics alike, in visit order
    struct Snapshot(Vec<Vec<f32>>);

    impl<Bk: Backend> ModuleVisitor<Bk> for Snapshot {
        fn visit_float<const D: usize>(&mut self, _id: ParamId, tensor: &Tensor<Bk, D>) {
            self.0.push(tensor.to_data().to_vec::<f32>().unwrap());
        }
    }

    pub(crate) fn snapshot<Bk: Backend>(model: &SimpleConv3<Bk>) -> Vec<Vec<f32>> {
        let mut snap = Snapshot(Vec::new());
        model.visit(&mut snap);
        snap.0
    }

    #[test]
    fn test_snapshot_covers_running_stats() {
        let l = learner();
        // conv 2 + bn 4 (gamma, beta, running mean, running var) per block, linear 2 × 3
        assert_eq!(snapshot(l.model()).len(), 3 * (2 + 4) + 3 * 2);
    }

    #[test]
    fn test_count_correct_breaks_ties_to_lowest_index() {
        let device = Default::default();
        let logits = Tensor::<InnerBackend, 2>::from_data(
            TensorData::new(vec![0.5f32, 0.5, 0.5, 0.1, 0.9, 0.9], [2, 3]),
            &device,
        );
        let targets = Tensor::<InnerBackend, 1, Int>::from_data(
            TensorData::new(vec![0i64, 1], [2]),
            &device,
        );
        assert_eq!(count_correct(logits, targets), 2);
    }

    #[test]
    fn test_count_correct_uses_argmax() {
        let device = Default::default();
        let logits = Tensor::<InnerBackend, 2>::from_data(
            TensorData::new(vec![0.1f32, 0.9, 0.7, 0.2, 0.3, 0.6], [3, 2]),
            &device,
        );
        let targets = Tensor::<InnerBackend, 1, Int>::from_data(
            TensorData::new(vec![1i64, 0, 0], [3]),
            &device,
        );
        // Rows predict 1, 0, 1 against labels 1, 0, 0
        assert_eq!(count_correct(logits, targets), 2);
    }

    #[test]
    fn test_train_step_updates_parameters() {
        let mut l = learner();
        let before = head_weights(&l);

        l.set_mode(Mode::Train);
        let out = l.train_step(batch::<TestBackend>(&Default::default(), 4)).unwrap();

        assert!(out.loss.is_finite());
        assert!(out.correct <= 4);
        assert_ne!(before, head_weights(&l));
    }

    #[test]
    fn test_valid_step_leaves_parameters_bit_identical() {
        let mut l = learner();

        // Move the running stats away from their init values first
        l.set_mode(Mode::Train);
        l.train_step(batch::<TestBackend>(&Default::default(), 4)).unwrap();
        let before = snapshot(l.model());

        l.set_mode(Mode::Eval);
        for _ in 0..3 {
            l.valid_step(batch::<InnerBackend>(&Default::default(), 4)).unwrap();
        }
        l.set_mode(Mode::Train);

        assert_eq!(before, snapshot(l.model()));
    }

    #[test]
    fn test_valid_step_requires_eval_mode() {
        let mut l = learner();
        l.set_mode(Mode::Train);
        let err = l.valid_step(batch::<InnerBackend>(&Default::default(), 2)).unwrap_err();
        assert!(matches!(err.downcast_ref::<TrainError>(), Some(TrainError::NotInEvalMode)));
    }

    #[test]
    fn test_schedule_steps_learning_rate() {
        let mut l = learner();
        for _ in 0..100 {
            l.step_schedule();
        }
        assert!((l.learning_rate() - 0.01).abs() < 1e-12);
    }
}
