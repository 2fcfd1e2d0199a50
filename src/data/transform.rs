// ============================================================
// Layer 4 — Image Transforms
// ============================================================
// Turns a decoded RGB image into the normalised CHW floats the
// model consumes.
//
// Train (fresh randomness on every call):
//   1. Random resized crop: pick an area in [0.8, 1.0] of the
//      image and an aspect ratio in [0.8, 1.2] (log-uniform),
//      crop it at a random position, resize to crop_size²
//   2. Horizontal flip with probability 0.5
//
// Val (deterministic):
//   1. Resize so the shorter side equals image_size (64)
//   2. Center crop crop_size² (48)
//
// Both then scale to [0, 1] and normalise each channel with
// mean 0.5 / std 0.5, so values end up in [-1, 1].
//
// Reference: image crate documentation (imageops)
//            rand crate documentation

use image::{
    imageops::{self, FilterType},
    RgbImage,
};
use rand::Rng;

pub const CHANNEL_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
pub const CHANNEL_STD:  [f32; 3] = [0.5, 0.5, 0.5];

/// Attempts at sampling a crop that fits before falling back to a center crop
const CROP_ATTEMPTS: usize = 10;

#[derive(Debug, Clone)]
pub enum Transform {
    Train {
        crop_size: u32,
        scale:     (f64, f64),
        ratio:     (f64, f64),
        flip_prob: f64,
    },
    Val {
        resize:    u32,
        crop_size: u32,
    },
}

impl Transform {
    pub fn train(crop_size: u32) -> Self {
        Transform::Train {
            crop_size,
            scale:     (0.8, 1.0),
            ratio:     (0.8, 1.2),
            flip_prob: 0.5,
        }
    }

    pub fn val(resize: u32, crop_size: u32) -> Self {
        Transform::Val { resize, crop_size }
    }

    /// Side length of every image this transform produces
    pub fn output_size(&self) -> u32 {
        match self {
            Transform::Train { crop_size, .. } | Transform::Val { crop_size, .. } => *crop_size,
        }
    }

    /// Apply the geometric part of the pipeline
    pub fn apply<R: Rng + ?Sized>(&self, img: &RgbImage, rng: &mut R) -> RgbImage {
        match *self {
            Transform::Train { crop_size, scale, ratio, flip_prob } => {
                let (x, y, w, h) = sample_crop(img.width(), img.height(), scale, ratio, rng);
                let cropped = imageops::crop_imm(img, x, y, w, h).to_image();
                let resized = imageops::resize(&cropped, crop_size, crop_size, FilterType::Triangle);
                if rng.gen_bool(flip_prob) {
                    imageops::flip_horizontal(&resized)
                } else {
                    resized
                }
            }
            Transform::Val { resize, crop_size } => {
                let resized = resize_shorter_side(img, resize);
                center_crop(&resized, crop_size)
            }
        }
    }

    /// Geometric transform followed by normalisation to CHW floats
    pub fn to_tensor_data<R: Rng + ?Sized>(&self, img: &RgbImage, rng: &mut R) -> Vec<f32> {
        normalize_chw(&self.apply(img, rng))
    }
}

/// Pick (x, y, width, height) of a random crop with the given
/// relative area and aspect-ratio ranges.
fn sample_crop<R: Rng + ?Sized>(
    width:  u32,
    height: u32,
    scale:  (f64, f64),
    ratio:  (f64, f64),
    rng:    &mut R,
) -> (u32, u32, u32, u32) {
    let area = (width * height) as f64;
    let (log_lo, log_hi) = (ratio.0.ln(), ratio.1.ln());

    for _ in 0..CROP_ATTEMPTS {
        let target_area = area * rng.gen_range(scale.0..=scale.1);
        let aspect      = rng.gen_range(log_lo..=log_hi).exp();

        let w = (target_area * aspect).sqrt().round() as u32;
        let h = (target_area / aspect).sqrt().round() as u32;

        if w > 0 && h > 0 && w <= width && h <= height {
            let x = rng.gen_range(0..=width - w);
            let y = rng.gen_range(0..=height - h);
            return (x, y, w, h);
        }
    }

    // Fallback: largest center crop whose aspect ratio is inside `ratio`
    let in_ratio = width as f64 / height as f64;
    let (w, h) = if in_ratio < ratio.0 {
        (width, ((width as f64 / ratio.0).round() as u32).clamp(1, height))
    } else if in_ratio > ratio.1 {
        (((height as f64 * ratio.1).round() as u32).clamp(1, width), height)
    } else {
        (width, height)
    };
    ((width - w) / 2, (height - h) / 2, w, h)
}

/// Resize keeping aspect ratio so that min(width, height) == `size`
pub fn resize_shorter_side(img: &RgbImage, size: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let (nw, nh) = if w <= h {
        (size, ((size as u64 * h as u64) / w as u64) as u32)
    } else {
        (((size as u64 * w as u64) / h as u64) as u32, size)
    };
    imageops::resize(img, nw, nh, FilterType::Triangle)
}

/// Crop a `size`×`size` square from the middle of the image.
/// Images smaller than `size` are scaled up first.
pub fn center_crop(img: &RgbImage, size: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    if w < size || h < size {
        let scaled = resize_shorter_side(img, size);
        return center_crop(&scaled, size);
    }
    let x = ((w - size) as f64 / 2.0).round() as u32;
    let y = ((h - size) as f64 / 2.0).round() as u32;
    imageops::crop_imm(img, x, y, size, size).to_image()
}

/// [H, W, 3] u8 → [3, H, W] f32, scaled to [0, 1] then normalised
pub fn normalize_chw(img: &RgbImage) -> Vec<f32> {
    let (w, h) = img.dimensions();
    let plane  = (w * h) as usize;
    let mut out = vec![0.0f32; 3 * plane];

    for (x, y, pixel) in img.enumerate_pixels() {
        let idx = (y * w + x) as usize;
        for c in 0..3 {
            let v = pixel[c] as f32 / 255.0;
            out[c * plane + idx] = (v - CHANNEL_MEAN[c]) / CHANNEL_STD[c];
        }
    }
    out
}
