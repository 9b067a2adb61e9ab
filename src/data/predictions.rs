// ============================================================
// Layer 4 - Model Output Reader
// ============================================================
// Reads the scores and attentions an external model produced
// for a test set, keyed by sample id:
//
//   {
//     "17": {
//       "scores": [0.12, 0.93, 0.05],
//       "watts":  [[0.4, 0.6], [0.9, 0.1]],
//       "satts":  [0.7, 0.3]
//     },
//     ...
//   }
//
// watts and satts may be omitted when only metrics are needed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

/// Model output for one sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// One score per label class
    pub scores: Vec<f32>,

    /// Word attentions, one row per sentence
    #[serde(default)]
    pub watts: Vec<Vec<f32>>,

    /// Sentence attentions
    #[serde(default)]
    pub satts: Vec<f32>,
}

pub type Predictions = HashMap<String, Prediction>;

pub fn load_predictions(path: impl AsRef<Path>) -> Result<Predictions> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read predictions '{}'", path.display()))?;
    let preds: Predictions = serde_json::from_str(&json)
        .with_context(|| format!("Malformed predictions file '{}'", path.display()))?;

    tracing::info!("Loaded predictions for {} samples from '{}'", preds.len(), path.display());
    Ok(preds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attentions_are_optional() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("preds.json");
        fs::write(&path, r#"{"3": {"scores": [0.1, 0.9]}}"#).unwrap();

        let preds = load_predictions(&path).unwrap();
        assert_eq!(preds["3"].scores, vec![0.1, 0.9]);
        assert!(preds["3"].watts.is_empty());
    }

    #[test]
    fn test_malformed_file_fails() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("preds.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(load_predictions(&path).is_err());
    }
}
