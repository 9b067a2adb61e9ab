// ============================================================
// mhan-util
// ============================================================
// Data loading and evaluation utilities for multilingual
// hierarchical attention networks.
//
//   cli          Layer 1 - argument parsing and dispatch
//   application  Layer 2 - evaluate / export use cases
//   domain       Layer 3 - samples, languages, source trait
//   data         Layer 4 - store, embeddings, vectorizer
//   eval         Layer 5 - one-error and prediction export
//   infra        Layer 6 - checkpoints, run config, metrics

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod eval;
pub mod infra;
