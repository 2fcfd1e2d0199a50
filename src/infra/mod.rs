// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File formats and external tooling:
//
//   config.rs     — YAML configuration file
//   checkpoint.rs — final weights via Burn's CompactRecorder,
//                   plus the resolved config as JSON
//   metrics.rs    — scalar sinks: TensorBoard event files and
//                   a CSV copy of every scalar
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// YAML config file loading
pub mod config;

/// Model checkpoint saving
pub mod checkpoint;

/// TensorBoard and CSV scalar sinks
pub mod metrics;
