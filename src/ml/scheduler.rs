// ============================================================
// Layer 5 — Step Learning-Rate Schedule
// ============================================================
// lr(epoch) = base_lr * gamma ^ floor(epoch / step_size)
//
// With the defaults (base 0.1, step 100, gamma 0.1):
//   epochs   0..=99  → 0.1
//   epochs 100..=199 → 0.01
//   epochs 200..=299 → 0.001
//
// Reference: Burn Book §5 (Learning rate schedulers)

#[derive(Debug, Clone)]
pub struct StepLr {
    base_lr:   f64,
    step_size: usize,
    gamma:     f64,
    epoch:     usize,
}

impl StepLr {
    /// `step_size` of zero is treated as one (decay every epoch)
    pub fn new(base_lr: f64, step_size: usize, gamma: f64) -> Self {
        Self { base_lr, step_size: step_size.max(1), gamma, epoch: 0 }
    }

    /// Learning rate for the current epoch
    pub fn lr(&self) -> f64 {
        let decays = (self.epoch / self.step_size) as i32;
        self.base_lr * self.gamma.powi(decays)
    }

    /// Move to the next epoch
    pub fn step(&mut self) {
        self.epoch += 1;
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }
}
