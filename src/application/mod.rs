// ============================================================
// Layer 2 - Application Layer (Use Cases)
// ============================================================
// Each use case wires the data, eval and infra layers together
// for one CLI command. Use cases take plain config structs,
// never clap types.
//
//   evaluate_use_case.rs - mean one-error of a model on a test store
//   export_use_case.rs   - top-k predictions + attentions as JSON

/// Scores a model's predictions with the one-error metric
pub mod evaluate_use_case;

/// Exports decoded top-k predictions and attentions
pub mod export_use_case;
