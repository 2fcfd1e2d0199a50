// ============================================================
// Layer 4 — Split Loaders
// ============================================================
// Wraps a Burn DataLoader together with the split's sample
// count so the training loop can see it as a BatchSource.
//
//   train  → shuffled, reshuffled on every traversal, runs
//            on the autodiff backend
//   val    → fixed order, runs on the inner backend so no
//            autodiff graph is ever built for it
//
// Worker threads (num_workers) only affect throughput; the
// loop never depends on how many there are.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

use std::sync::Arc;

use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};

use crate::data::{
    batcher::{ImageBatch, ImageBatcher},
    dataset::ImageDataset,
};
use crate::domain::traits::BatchSource;

/// Batch size, worker count and shuffling for one split
#[derive(Debug, Clone, Copy)]
pub struct LoaderOptions {
    pub batch_size:  usize,
    pub num_workers: usize,
    /// `Some(seed)` shuffles on every traversal
    pub shuffle:     Option<u64>,
}

pub struct SplitLoader<O> {
    name:    String,
    loader:  Arc<dyn DataLoader<O>>,
    samples: usize,
}

impl<B: Backend> SplitLoader<ImageBatch<B>> {
    pub fn new(
        name:    &str,
        dataset: ImageDataset,
        device:  B::Device,
        opts:    LoaderOptions,
    ) -> Self {
        let samples = dataset.sample_count();
        let batcher = ImageBatcher::<B>::new(device, dataset.image_size());

        let mut builder = DataLoaderBuilder::new(batcher).batch_size(opts.batch_size);
        if let Some(seed) = opts.shuffle {
            builder = builder.shuffle(seed);
        }
        if opts.num_workers > 0 {
            builder = builder.num_workers(opts.num_workers);
        }

        tracing::debug!(
            "Split '{}': {} samples, batch_size={}, workers={}, shuffle={:?}",
            name, samples, opts.batch_size, opts.num_workers, opts.shuffle
        );

        Self {
            name: name.to_string(),
            loader: builder.build(dataset),
            samples,
        }
    }
}

impl<O> SplitLoader<O> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<O> BatchSource<O> for SplitLoader<O> {
    fn batches(&self) -> Box<dyn Iterator<Item = O> + '_> {
        Box::new(self.loader.iter())
    }

    fn sample_count(&self) -> usize {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    use crate::data::{image_folder::LabeledImage, transform::Transform};

    fn dataset(n: usize) -> ImageDataset {
        let samples = (0..n)
            .map(|i| LabeledImage {
                image: RgbImage::from_pixel(64, 64, Rgb([i as u8, 0, 0])),
                label: i % 2,
                path:  PathBuf::from(format!("{i}.png")),
            })
            .collect();
        ImageDataset::new(samples, Transform::val(64, 48))
    }

    /// Every sample gets its own label so traversal order is visible
    fn distinct(n: usize) -> ImageDataset {
        let samples = (0..n)
            .map(|i| LabeledImage {
                image: RgbImage::from_pixel(64, 64, Rgb([0, i as u8, 0])),
                label: i,
                path:  PathBuf::from(format!("{i}.png")),
            })
            .collect();
        ImageDataset::new(samples, Transform::val(64, 48))
    }

    fn labels_of(loader: &SplitLoader<ImageBatch<NdArray>>) -> Vec<Vec<i64>> {
        loader
            .batches()
            .map(|b| b.targets.into_data().to_vec::<i64>().unwrap())
            .collect()
    }

    #[test]
    fn test_last_batch_may_be_short() {
        let opts   = LoaderOptions { batch_size: 4, num_workers: 0, shuffle: None };
        let loader = SplitLoader::<ImageBatch<NdArray>>::new("val", dataset(10), Default::default(), opts);

        let sizes: Vec<usize> = labels_of(&loader).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(loader.sample_count(), 10);
        assert_eq!(loader.name(), "val");
    }

    #[test]
    fn test_unshuffled_order_is_stable() {
        let opts   = LoaderOptions { batch_size: 3, num_workers: 0, shuffle: None };
        let loader = SplitLoader::<ImageBatch<NdArray>>::new("val", dataset(6), Default::default(), opts);

        assert_eq!(labels_of(&loader), vec![vec![0, 1, 0], vec![1, 0, 1]]);
        assert_eq!(labels_of(&loader), labels_of(&loader));
    }

    #[test]
    fn test_shuffled_traversal_covers_every_sample() {
        let opts   = LoaderOptions { batch_size: 5, num_workers: 0, shuffle: Some(42) };
        let loader = SplitLoader::<ImageBatch<NdArray>>::new("train", dataset(20), Default::default(), opts);

        for _ in 0..3 {
            let all: Vec<i64> = labels_of(&loader).into_iter().flatten().collect();
            assert_eq!(all.len(), 20);
            assert_eq!(all.iter().filter(|&&l| l == 1).count(), 10);
        }
    }

    #[test]
    fn test_train_order_changes_between_passes() {
        for workers in [0, 4] {
            let opts   = LoaderOptions { batch_size: 8, num_workers: workers, shuffle: Some(42) };
            let loader = SplitLoader::<ImageBatch<NdArray>>::new("train", distinct(32), Default::default(), opts);

            let first:  Vec<i64> = labels_of(&loader).into_iter().flatten().collect();
            let second: Vec<i64> = labels_of(&loader).into_iter().flatten().collect();
            assert_ne!(first, second, "workers={workers}");

            for pass in [first, second] {
                let mut sorted = pass;
                sorted.sort_unstable();
                assert_eq!(sorted, (0..32).collect::<Vec<i64>>(), "workers={workers}");
            }
        }
    }
}
