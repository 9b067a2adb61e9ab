// ============================================================
// Layer 5 - Evaluation
// ============================================================
// Works on the outputs of an external MHAN model:
//
//   metrics.rs - one-error of ranked label predictions
//
//   export.rs  - top-k predictions with word and sentence
//                attentions, decoded back to text for inspection
//
// The model itself (inference, attention) lives outside this crate;
// these functions only see its score and attention arrays.
//
// Reference: Zhang & Zhou (2014) A Review on Multi-Label Learning

/// One-error metric for multi-label predictions
pub mod metrics;

/// Top-k prediction export with attentions
pub mod export;
