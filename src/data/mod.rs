// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between files on disk and padded samples:
//
//   dataset store (.parquet)   word vectors (.bin)
//       │                          │
//       ▼                          ▼
//   DatasetStore               load_word_vectors
//       │
//       ▼
//   load_vectors / load_vectors_bup → pad tokens, multi-hot labels
//       │
//       ▼
//   SampleDataset              → burn Dataset for training loops
//
// Each module is responsible for exactly one step.
//
// Reference: Burn Book §4 (Datasets)
//            Rust Book §13 (Iterators and Closures)

/// Reads word-index and label columns from a Parquet store
pub mod store;

/// Loads pretrained word-embedding tables
pub mod embeddings;

/// Pads token sequences and builds multi-hot label vectors
pub mod vectorizer;

/// Implements Burn's Dataset trait for vectorized samples
pub mod dataset;

/// Reads model scores and attentions keyed by sample id
pub mod predictions;
