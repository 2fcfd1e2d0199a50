// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<ImageItem>
// into tensors on the configured device.
//
//   Input:  N ImageItems, each 3·S·S normalised floats (CHW)
//   Output: images  [N, 3, S, S]  (Float)
//           targets [N]           (Int)
//
// Creating the tensors directly on the target device is the
// "move to device" step of the training loop.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ImageItem;

const CHANNELS: usize = 3;

/// A batch of images ready for the forward pass.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Shape: [batch_size, 3, height, width]
    pub images:  Tensor<B, 4>,
    /// Shape: [batch_size], class indices
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    device:     B::Device,
    image_size: usize,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device, image_size: usize) -> Self {
        Self { device, image_size }
    }
}

impl<B: Backend> Batcher<ImageItem, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageItem>) -> ImageBatch<B> {
        let batch_size = items.len();
        let side       = self.image_size;

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|item| item.pixels.iter().copied())
            .collect();
        let labels: Vec<i64> = items
            .iter()
            .map(|item| item.label as i64)
            .collect();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(pixels, [batch_size, CHANNELS, side, side]),
            &self.device,
        );
        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]),
            &self.device,
        );

        ImageBatch { images, targets }
    }
}
