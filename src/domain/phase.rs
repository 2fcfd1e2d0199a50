// ============================================================
// Layer 3 — Phase and Mode
// ============================================================
// An epoch is one pass over Phase::Train followed by one pass
// over Phase::Val. Each phase implies a model Mode, which is
// handed to the model's forward pass instead of being kept as
// a hidden flag on the model.

use std::fmt;

/// One half of an epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Train,
    Val,
}

impl Phase {
    /// Every epoch runs the phases in exactly this order
    pub const ORDER: [Phase; 2] = [Phase::Train, Phase::Val];

    /// Directory name of the split that feeds this phase
    pub fn split_name(self) -> &'static str {
        match self {
            Phase::Train => "train",
            Phase::Val => "val",
        }
    }

    pub fn mode(self) -> Mode {
        match self {
            Phase::Train => Mode::Train,
            Phase::Val => Mode::Eval,
        }
    }

    /// Scalar series name for the epoch loss, e.g. `data/trainloss`
    pub fn loss_tag(self) -> String {
        format!("data/{}loss", self.split_name())
    }

    /// Scalar series name for the epoch accuracy, e.g. `data/valacc`
    pub fn acc_tag(self) -> String {
        format!("data/{}acc", self.split_name())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.split_name())
    }
}

/// Two-state switch for gradient tracking and stochastic layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Gradients tracked, dropout active, batch-norm statistics updated
    Train,
    /// No gradients, deterministic layers, parameters frozen
    Eval,
}

impl Mode {
    pub fn is_train(self) -> bool {
        matches!(self, Mode::Train)
    }
}
