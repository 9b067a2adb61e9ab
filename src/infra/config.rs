// ============================================================
// Layer 6 - Run Configuration
// ============================================================
// A pre-trained model ships with the arguments it was trained
// with (args.json). When the model is reloaded for a new run,
// the run-time flags given on the command line replace the
// saved ones, and the language list falls back to the saved
// one if the command line does not name any.
//
// Reference: serde_json crate documentation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Saved model arguments, as a mutable JSON object.
pub type ModelArgs = Map<String, Value>;

/// Run-time fields copied from the command line into the model args.
pub const RUN_FIELDS: [&str; 12] = [
    "train", "path", "source", "target", "test", "store_test",
    "t", "mode", "seen_ids", "unseen_ids", "chunks", "bs",
];

/// Run-time options of one invocation.
/// Built from the CLI arguments; the application layer never sees clap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    pub train:      bool,
    pub path:       Option<String>,
    pub source:     Option<String>,
    pub target:     Option<String>,
    pub test:       bool,
    pub store_test: bool,
    pub t:          f64,
    pub mode:       Option<String>,
    pub seen_ids:   Option<String>,
    pub unseen_ids: Option<String>,
    pub chunks:     usize,
    pub bs:         usize,
    pub languages:  Option<Vec<String>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            train:      false,
            path:       None,
            source:     None,
            target:     None,
            test:       false,
            store_test: false,
            t:          0.4,
            mode:       None,
            seen_ids:   None,
            unseen_ids: None,
            chunks:     1,
            bs:         16,
            languages:  None,
        }
    }
}

/// Overwrite the run-time fields of `args` with those of `parsed`, and
/// fill `parsed.languages` from `args["languages"]` when it is unset.
///
/// Fails if languages are needed but the saved args have no valid
/// "languages" list.
pub fn load_missing_args(args: &mut ModelArgs, parsed: &mut RunOptions) -> Result<()> {
    let given = serde_json::to_value(&*parsed)?;

    for field in RUN_FIELDS {
        let value = given.get(field).cloned().unwrap_or(Value::Null);
        args.insert(field.to_string(), value);
    }

    if parsed.languages.is_none() {
        let saved = args
            .get("languages")
            .context("No languages given and the model args have no 'languages'")?;
        let languages: Vec<String> = serde_json::from_value(saved.clone())
            .context("Model arg 'languages' is not a list of strings")?;

        tracing::debug!("Using saved languages: {:?}", languages);
        parsed.languages = Some(languages);
    }

    Ok(())
}
