// ============================================================
// Layer 5 — SimpleConv3 Model
// ============================================================
// Small image classifier:
//
//   [N, 3, 48, 48]
//     → conv 3×3 s2 (3→12)  → BN → ReLU    [N, 12, 23, 23]
//     → conv 3×3 s2 (12→24) → BN → ReLU    [N, 24, 11, 11]
//     → conv 3×3 s2 (24→48) → BN → ReLU    [N, 48,  5,  5]
//     → flatten → (dropout, train only)
//     → linear 1200 → 1200 → ReLU
//     → linear 1200 → 128  → ReLU
//     → linear 128  → num_classes          [N, num_classes]
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig,
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::phase::Mode;

const CONV_CHANNELS: [usize; 4] = [3, 12, 24, 48];
const HIDDEN: [usize; 2] = [1200, 128];

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SimpleConv3Config {
    pub num_classes: usize,
    /// Side length of the square input crop
    #[config(default = "48")]
    pub input_size:  usize,
    /// Dropout in front of the classifier head, training mode only
    #[config(default = "0.0")]
    pub dropout:     f64,
}

impl SimpleConv3Config {
    /// Spatial side after the three 3×3 stride-2 convolutions (no padding).
    /// 48 → 23 → 11 → 5
    pub fn feature_side(&self) -> usize {
        (0..3).fold(self.input_size, |side, _| side.saturating_sub(3) / 2 + 1)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> SimpleConv3<B> {
        let conv = |i: usize| -> Conv2d<B> {
            Conv2dConfig::new([CONV_CHANNELS[i], CONV_CHANNELS[i + 1]], [3, 3])
                .with_stride([2, 2])
                .init(device)
        };
        let bn = |i: usize| -> BatchNorm<B, 2> {
            BatchNormConfig::new(CONV_CHANNELS[i + 1]).init(device)
        };

        let side     = self.feature_side();
        let flat_dim = CONV_CHANNELS[3] * side * side;

        SimpleConv3 {
            conv1: conv(0), bn1: bn(0),
            conv2: conv(1), bn2: bn(1),
            conv3: conv(2), bn3: bn(2),
            fc1: LinearConfig::new(flat_dim,  HIDDEN[0]).init(device),
            fc2: LinearConfig::new(HIDDEN[0], HIDDEN[1]).init(device),
            fc3: LinearConfig::new(HIDDEN[1], self.num_classes).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

/// Three conv/batch-norm/ReLU stages followed by a three-layer MLP head.
#[derive(Module, Debug)]
pub struct SimpleConv3<B: Backend> {
    pub conv1:   Conv2d<B>,
    pub bn1:     BatchNorm<B, 2>,
    pub conv2:   Conv2d<B>,
    pub bn2:     BatchNorm<B, 2>,
    pub conv3:   Conv2d<B>,
    pub bn3:     BatchNorm<B, 2>,
    pub fc1:     Linear<B>,
    pub fc2:     Linear<B>,
    pub fc3:     Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> SimpleConv3<B> {
    /// images: [batch, 3, H, W] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>, mode: Mode) -> Tensor<B, 2> {
        let x = relu(self.bn1.forward(self.conv1.forward(images)));
        let x = relu(self.bn2.forward(self.conv2.forward(x)));
        let x = relu(self.bn3.forward(self.conv3.forward(x)));

        let x = x.flatten::<2>(1, 3);
        let x = if mode.is_train() { self.dropout.forward(x) } else { x };

        let x = relu(self.fc1.forward(x));
        let x = relu(self.fc2.forward(x));
        self.fc3.forward(x)
    }
}
