// ============================================================
// Layer 3 - Vectorized Sample
// ============================================================
// One document after vectorization:
//
//   token_ids: fixed-length word ids (length = wpad)
//   labels:    one slot per label class (length = num_labels)
//
// Example (wpad = 6, num_labels = 4):
//   raw tokens  [12, 7, 301]     → token_ids [12, 7, 301, 0, 0, 0]
//   raw labels  [1, 3]           → labels    [0, 1, 0, 1]
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// A padded sample ready to be fed to an external model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizedSample {
    /// Sample id in the dataset store ("" for positional samples)
    pub id: String,

    /// Word ids, padded or truncated to wpad
    pub token_ids: Vec<u32>,

    /// Multi-hot label vector, one entry per label class
    pub labels: Vec<f32>,
}

impl VectorizedSample {
    pub fn new(id: impl Into<String>, token_ids: Vec<u32>, labels: Vec<f32>) -> Self {
        Self { id: id.into(), token_ids, labels }
    }

    /// Split the flat token sequence into sentences of
    /// `words_per_sentence` ids each, as a hierarchical model reads it.
    /// The last sentence is shorter when the width does not divide evenly.
    pub fn sentences(&self, words_per_sentence: usize) -> Vec<Vec<u32>> {
        if words_per_sentence == 0 {
            return vec![self.token_ids.clone()];
        }
        self.token_ids
            .chunks(words_per_sentence)
            .map(|c| c.to_vec())
            .collect()
    }
}
