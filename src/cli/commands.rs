// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the subcommands and all their configurable flags.
//
// clap's derive macros generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    evaluate_use_case::EvaluateConfig,
    export_use_case::{ExportConfig, SourceLanguage},
};
use crate::infra::config::RunOptions;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show sample and label counts of a dataset store
    Inspect(InspectArgs),

    /// Print the epoch and weights file with the best validation score
    PickBest(PickBestArgs),

    /// Compute the mean one-error of model predictions on a test store
    Evaluate(EvaluateArgs),

    /// Export top-k predictions with attentions as JSON
    Export(ExportArgs),

    /// Merge run-time flags into a model's saved arguments
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Dataset store (.parquet)
    #[arg(long)]
    pub store: String,
}

#[derive(Args, Debug)]
pub struct PickBestArgs {
    /// Experiment folder with val* score files and weights* files
    #[arg(long)]
    pub dev_path: String,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Test dataset store (.parquet)
    #[arg(long)]
    pub store: String,

    /// Model predictions JSON, keyed by sample id
    #[arg(long)]
    pub predictions: String,

    /// Language name of the test set (e.g. english)
    #[arg(long)]
    pub language: String,

    /// Padding width for token sequences
    #[arg(long)]
    pub wpad: usize,

    /// Number of label classes
    #[arg(long)]
    pub num_labels: usize,

    /// Only evaluate these sample ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub ids: Option<Vec<String>>,

    /// Append results to <dir>/metrics.csv
    #[arg(long)]
    pub metrics_dir: Option<String>,
}

impl From<EvaluateArgs> for EvaluateConfig {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateConfig {
            store:       a.store,
            predictions: a.predictions,
            language:    a.language,
            wpad:        a.wpad,
            num_labels:  a.num_labels,
            ids:         a.ids,
            metrics_dir: a.metrics_dir,
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Language name of the test set (e.g. german)
    #[arg(long)]
    pub language: String,

    /// Test dataset store (.parquet)
    #[arg(long)]
    pub store: String,

    /// Word vectors of the test language
    #[arg(long)]
    pub vectors: String,

    /// Model predictions JSON with scores, watts and satts
    #[arg(long)]
    pub predictions: String,

    /// Output JSON file
    #[arg(long, default_value = "export.json")]
    pub out: String,

    /// Padding width for token sequences
    #[arg(long)]
    pub wpad: usize,

    /// Words per sentence when splitting padded sequences
    #[arg(long, default_value_t = 30)]
    pub words_per_sentence: usize,

    /// Number of label classes
    #[arg(long)]
    pub num_labels: usize,

    /// Predictions kept per document
    #[arg(long, default_value_t = 20)]
    pub top_k: usize,

    /// Language the model's labels come from, when it differs
    #[arg(long, requires_all = ["source_store", "source_vectors"])]
    pub source_language: Option<String>,

    /// Dataset store holding the source language's label map
    #[arg(long)]
    pub source_store: Option<String>,

    /// Word vectors of the source language
    #[arg(long)]
    pub source_vectors: Option<String>,
}

impl From<ExportArgs> for ExportConfig {
    fn from(a: ExportArgs) -> Self {
        let source = match (a.source_language, a.source_store, a.source_vectors) {
            (Some(language), Some(store), Some(vectors)) => {
                Some(SourceLanguage { language, store, vectors })
            }
            _ => None,
        };
        ExportConfig {
            language:           a.language,
            store:              a.store,
            vectors:            a.vectors,
            predictions:        a.predictions,
            out:                a.out,
            wpad:               a.wpad,
            words_per_sentence: a.words_per_sentence,
            num_labels:         a.num_labels,
            top_k:              a.top_k,
            source,
        }
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Experiment folder holding args.json
    #[arg(long)]
    pub dev_path: String,

    /// Write the merged arguments back to args.json
    #[arg(long)]
    pub save: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Run-time flags that replace a pre-trained model's saved ones.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Train a new model
    #[arg(long)]
    pub train: bool,

    /// Experiment path of the model
    #[arg(long)]
    pub path: Option<String>,

    /// Source language
    #[arg(long)]
    pub source: Option<String>,

    /// Target language
    #[arg(long)]
    pub target: Option<String>,

    /// Evaluate on the test set
    #[arg(long)]
    pub test: bool,

    /// Store test predictions
    #[arg(long)]
    pub store_test: bool,

    /// Decision threshold on label scores
    #[arg(long, default_value_t = 0.4)]
    pub t: f64,

    /// Evaluation mode
    #[arg(long)]
    pub mode: Option<String>,

    /// File with the ids of labels seen during training
    #[arg(long)]
    pub seen_ids: Option<String>,

    /// File with the ids of labels unseen during training
    #[arg(long)]
    pub unseen_ids: Option<String>,

    /// Number of chunks the training data is read in
    #[arg(long, default_value_t = 1)]
    pub chunks: usize,

    /// Batch size
    #[arg(long, default_value_t = 16)]
    pub bs: usize,

    /// Languages of the run (comma separated); saved ones when omitted
    #[arg(long, value_delimiter = ',')]
    pub languages: Option<Vec<String>>,
}

impl From<RunArgs> for RunOptions {
    fn from(a: RunArgs) -> Self {
        RunOptions {
            train:      a.train,
            path:       a.path,
            source:     a.source,
            target:     a.target,
            test:       a.test,
            store_test: a.store_test,
            t:          a.t,
            mode:       a.mode,
            seen_ids:   a.seen_ids,
            unseen_ids: a.unseen_ids,
            chunks:     a.chunks,
            bs:         a.bs,
            languages:  a.languages,
        }
    }
}
