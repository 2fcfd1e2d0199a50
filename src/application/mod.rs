// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to run one training job.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - Only workflow coordination and config resolution
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// Config resolution and the training workflow
pub mod train_use_case;
