// ============================================================
// Layer 4 — Image Dataset
// ============================================================
// Implements Burn's Dataset trait over the decoded images of
// one split. The transform runs on every get(), so the train
// split sees a fresh random crop and flip each epoch.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

use burn::data::dataset::Dataset;
use rand::thread_rng;

use crate::data::image_folder::LabeledImage;
use crate::data::transform::Transform;

/// One preprocessed sample: CHW floats plus its class index.
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub pixels: Vec<f32>,
    pub label:  usize,
}

/// Decoded images of one split with the transform applied on access.
///
/// The train transform is random, so two reads of the same index
/// yield different crops.
pub struct ImageDataset {
    samples:   Vec<LabeledImage>,
    transform: Transform,
}

impl ImageDataset {
    pub fn new(samples: Vec<LabeledImage>, transform: Transform) -> Self {
        Self { samples, transform }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn image_size(&self) -> usize {
        self.transform.output_size() as usize
    }
}

impl Dataset<ImageItem> for ImageDataset {
    fn get(&self, index: usize) -> Option<ImageItem> {
        let sample = self.samples.get(index)?;
        tracing::trace!("Sample {} from '{}'", index, sample.path.display());
        let pixels = self.transform.to_tensor_data(&sample.image, &mut thread_rng());
        Some(ImageItem { pixels, label: sample.label })
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    fn sample(label: usize) -> LabeledImage {
        LabeledImage {
            image: RgbImage::from_pixel(70, 64, Rgb([255, 255, 255])),
            label,
            path:  PathBuf::from(format!("img{label}.png")),
        }
    }

    #[test]
    fn test_get_returns_transformed_item() {
        let ds = ImageDataset::new(vec![sample(0), sample(3)], Transform::val(64, 48));

        let item = ds.get(1).unwrap();
        assert_eq!(item.label, 3);
        assert_eq!(item.pixels.len(), 3 * 48 * 48);
        assert!(item.pixels.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_out_of_range_is_none() {
        let ds = ImageDataset::new(vec![sample(0)], Transform::train(48));
        assert_eq!(ds.len(), 1);
        assert!(ds.get(1).is_none());
    }
}
