// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing a training run:
// which phase is running, how per-batch results are folded
// into epoch metrics, and the seams the training loop talks
// to (learner, batch source, scalar sink).
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// The training loop in Layer 5 is written purely against
// these traits, so it can be unit tested with fakes.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Typed error conditions for configuration, data, and the loop
pub mod error;

/// Train / val phases and the model mode each one implies
pub mod phase;

/// Per-batch outcomes and per-epoch aggregation
pub mod metrics;

/// Core abstractions (traits) that other layers implement
pub mod traits;
