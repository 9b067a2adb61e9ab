// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust structs and traits describing the data the
// utilities work on:
//
//   sample.rs   - a vectorized sample (padded tokens + label vector)
//   language.rs - language name to two-letter code table
//   traits.rs   - lookup seam between stores and vectorizers
//
// Rules for this layer:
//   - NO file I/O
//   - NO burn, arrow or parquet types
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A padded token sequence with its multi-hot label vector
pub mod sample;

// Language names used by the MHAN experiments
pub mod language;

// Core abstractions (traits) that other layers implement
pub mod traits;
