// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting file concerns:
//
//   checkpoint.rs - experiment folders: best-checkpoint
//                   selection by validation score, saved
//                   model arguments (args.json)
//
//   config.rs     - run-time options and the merge of
//                   command-line flags into saved model args
//
//   metrics.rs    - evaluation metrics appended to a CSV file
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Best-checkpoint selection and saved model arguments
pub mod checkpoint;

/// Run options and argument defaulting
pub mod config;

/// Evaluation metrics CSV logger
pub mod metrics;
