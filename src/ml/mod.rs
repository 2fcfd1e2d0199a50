// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Burn-specific code lives here, plus the backend-agnostic
// epoch loop that drives it.
//
//   model.rs     — SimpleConv3: three stride-2 conv blocks
//                  with batch norm, then a 3-layer MLP head
//   learner.rs   — forward, cross-entropy, backward and SGD
//                  step for one batch; frozen eval copy
//   trainer.rs   — the epoch × {train, val} loop, written
//                  against the domain traits only
//   scheduler.rs — step learning-rate decay
//   device.rs    — `device` setting → wgpu device
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// SimpleConv3 classifier architecture
pub mod model;

/// Burn-backed Learner implementation
pub mod learner;

/// Epoch loop with train and validation phases
pub mod trainer;

/// StepLR learning-rate schedule
pub mod scheduler;

/// Compute device selection
pub mod device;
