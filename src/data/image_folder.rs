// ============================================================
// Layer 4 — Image Folder Loader
// ============================================================
// Reads one split of a directory-per-class dataset:
//
//   data_dir/
//   ├── train/
//   │   ├── angry/     img001.jpg …
//   │   ├── happy/
//   │   └── …
//   └── val/
//       ├── angry/
//       └── …
//
// Class folders are sorted by name and numbered from 0, so the
// same folder names always map to the same labels. Every image
// is decoded once here, up front: a corrupt file stops the run
// before the first epoch instead of somewhere in the middle.
//
// Reference: walkdir and image crate documentation
//            Rust Book §9 (Error Handling)

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use image::{ImageReader, RgbImage};
use walkdir::WalkDir;

use crate::domain::error::TrainError;

/// File extensions treated as images (lower-case, without dot)
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "bmp", "ppm", "pgm", "tif", "tiff", "webp",
];

/// A decoded image and its class index
#[derive(Debug, Clone)]
pub struct LabeledImage {
    pub image: RgbImage,
    pub label: usize,
    pub path:  PathBuf,
}

/// All images of one split, labelled by their class folder
#[derive(Debug)]
pub struct ImageFolder {
    split:   String,
    classes: Vec<String>,
    samples: Vec<LabeledImage>,
}

impl ImageFolder {
    /// Scan and decode `data_dir/split`.
    pub fn open(data_dir: impl AsRef<Path>, split: &str) -> Result<Self> {
        let root = data_dir.as_ref().join(split);
        if !root.is_dir() {
            return Err(TrainError::MissingSplit(root).into());
        }

        let classes = class_folders(&root)?;
        tracing::info!("Split '{}': {} classes in '{}'", split, classes.len(), root.display());

        let mut samples = Vec::new();
        for (label, class) in classes.iter().enumerate() {
            let before = samples.len();
            for path in image_files(&root.join(class)) {
                let image = decode(&path)?;
                samples.push(LabeledImage { image, label, path });
            }

            let count = samples.len() - before;
            if count == 0 {
                tracing::warn!("Class folder '{}' in split '{}' has no images", class, split);
            }
            tracing::debug!("Class '{}' (label {}): {} images", class, label, count);
        }

        if samples.is_empty() {
            return Err(TrainError::EmptySplit { split: split.to_string(), root }.into());
        }

        tracing::info!("Split '{}': loaded {} images", split, samples.len());
        Ok(Self { split: split.to_string(), classes, samples })
    }

    pub fn split(&self) -> &str {
        &self.split
    }

    /// Class names in label order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Number of images per label
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for s in &self.samples {
            counts[s.label] += 1;
        }
        counts
    }

    pub fn into_samples(self) -> Vec<LabeledImage> {
        self.samples
    }
}

/// Both splits must use the same class folders, otherwise the
/// label numbering would silently differ between them.
pub fn ensure_same_classes(train: &ImageFolder, val: &ImageFolder) -> Result<(), TrainError> {
    if train.classes() != val.classes() {
        return Err(TrainError::ClassMismatch {
            train: train.classes().to_vec(),
            val:   val.classes().to_vec(),
        });
    }
    Ok(())
}

/// Immediate sub-directories of `root`, sorted by name
fn class_folders(root: &Path) -> Result<Vec<String>> {
    let mut classes = Vec::new();
    for entry in fs::read_dir(root)
        .with_context(|| format!("Cannot read directory '{}'", root.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                classes.push(name.to_string());
            }
        }
    }
    classes.sort();
    Ok(classes)
}

/// Image files anywhere below a class folder, in path order
fn image_files(class_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(class_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| has_image_extension(p))
        .collect()
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn decode(path: &Path) -> Result<RgbImage, TrainError> {
    let unreadable = |reason: String| TrainError::UnreadableImage {
        path: path.to_path_buf(),
        reason,
    };

    let img = ImageReader::open(path)
        .map_err(|e| unreadable(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| unreadable(e.to_string()))?
        .decode()
        .map_err(|e| unreadable(e.to_string()))?;

    Ok(img.to_rgb8())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::Rgb;

    /// Write a solid-colour PNG at `root/split/class/name`
    pub(crate) fn write_png(root: &Path, split: &str, class: &str, name: &str, colour: [u8; 3]) {
        let dir = root.join(split).join(class);
        fs::create_dir_all(&dir).unwrap();
        RgbImage::from_pixel(56, 52, Rgb(colour))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_labels_follow_sorted_class_names() {
        let tmp = tempfile::tempdir().unwrap();
        write_png(tmp.path(), "train", "sad",   "a.png", [0, 0, 255]);
        write_png(tmp.path(), "train", "angry", "a.png", [255, 0, 0]);
        write_png(tmp.path(), "train", "angry", "b.png", [255, 0, 0]);

        let folder = ImageFolder::open(tmp.path(), "train").unwrap();

        assert_eq!(folder.classes(), ["angry", "sad"]);
        assert_eq!(folder.class_counts(), vec![2, 1]);
        let samples = folder.into_samples();
        assert_eq!(samples[2].label, 1);
        assert_eq!(samples[2].image.get_pixel(0, 0), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_ignores_non_image_files() {
        let tmp = tempfile::tempdir().unwrap();
        write_png(tmp.path(), "val", "happy", "a.png", [1, 2, 3]);
        fs::write(tmp.path().join("val/happy/notes.txt"), "hello").unwrap();

        let folder = ImageFolder::open(tmp.path(), "val").unwrap();
        assert_eq!(folder.len(), 1);
    }

    #[test]
    fn test_missing_split_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ImageFolder::open(tmp.path(), "train").unwrap_err();
        assert!(matches!(err.downcast_ref::<TrainError>(), Some(TrainError::MissingSplit(_))));
    }

    #[test]
    fn test_empty_split_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("train/happy")).unwrap();
        let err = ImageFolder::open(tmp.path(), "train").unwrap_err();
        assert!(matches!(err.downcast_ref::<TrainError>(), Some(TrainError::EmptySplit { .. })));
    }

    #[test]
    fn test_corrupt_image_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("train/happy");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("broken.png"), b"not a png").unwrap();

        let err = ImageFolder::open(tmp.path(), "train").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrainError>(),
            Some(TrainError::UnreadableImage { .. })
        ));
    }

    #[test]
    fn test_class_mismatch_between_splits() {
        let tmp = tempfile::tempdir().unwrap();
        write_png(tmp.path(), "train", "happy", "a.png", [0, 0, 0]);
        write_png(tmp.path(), "train", "sad",   "a.png", [0, 0, 0]);
        write_png(tmp.path(), "val",   "happy", "a.png", [0, 0, 0]);

        let train = ImageFolder::open(tmp.path(), "train").unwrap();
        let val   = ImageFolder::open(tmp.path(), "val").unwrap();

        assert!(matches!(
            ensure_same_classes(&train, &val),
            Err(TrainError::ClassMismatch { .. })
        ));
    }
}
