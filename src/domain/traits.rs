// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The vectorizers only need to look samples up by id, so they
// are written against SampleSource rather than a concrete store.
//
// Implementations:
//   - DatasetStore  → Parquet-backed columnar store
//   - HashMap pair  → in-memory columns (tests, external drivers)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::collections::HashMap;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Anything that can resolve a sample id to its token ids and label ids.
pub trait SampleSource {
    /// Word ids of the sample, or None if the id is unknown.
    fn token_ids(&self, id: &str) -> Option<&[u32]>;

    /// Raw label ids of the sample, or None if the id is unknown.
    fn label_ids(&self, id: &str) -> Option<&[u32]>;
}

/// Two in-memory columns keyed by sample id: (X_ids, Y_ids).
impl SampleSource for (HashMap<String, Vec<u32>>, HashMap<String, Vec<u32>>) {
    fn token_ids(&self, id: &str) -> Option<&[u32]> {
        self.0.get(id).map(Vec::as_slice)
    }

    fn label_ids(&self, id: &str) -> Option<&[u32]> {
        self.1.get(id).map(Vec::as_slice)
    }
}
