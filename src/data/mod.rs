// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from image files on disk to device-ready tensor
// batches, in this order:
//
//   data_dir/{train,val}/<class>/<image>
//       │
//       ▼
//   ImageFolder       → scans class folders, decodes images
//       │
//       ▼
//   Transform         → random crop + flip (train) or
//                       resize + center crop (val), normalise
//       │
//       ▼
//   ImageDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher      → stacks items into tensors on the device
//       │
//       ▼
//   SplitLoader       → Burn DataLoader seen as a BatchSource
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Class-per-folder image scanning and decoding
pub mod image_folder;

/// Train and val image transforms
pub mod transform;

/// Implements Burn's Dataset trait for labelled images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Per-split data loaders
pub mod split;
