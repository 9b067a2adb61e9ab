// ============================================================
// Layer 2 - Evaluate Use Case
// ============================================================
// Scores a model's predictions on one test store:
//
//   Step 1: Open the dataset store            (Layer 4 - data)
//   Step 2: Vectorize the requested ids       (Layer 4 - data)
//   Step 3: Load the model's predictions      (Layer 4 - data)
//   Step 4: Mean one-error over the samples   (Layer 5 - eval)
//   Step 5: Append a row to metrics.csv       (Layer 6 - infra)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::SampleDataset,
    predictions::load_predictions,
    store::DatasetStore,
    vectorizer::load_vectors,
};
use crate::eval::metrics::mean_one_error;
use crate::infra::metrics::{EvalMetrics, MetricsLogger};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateConfig {
    pub store:       String,
    pub predictions: String,
    pub language:    String,
    pub wpad:        usize,
    pub num_labels:  usize,
    /// Evaluate these ids only; all store ids when None
    pub ids:         Option<Vec<String>>,
    /// Append results to <dir>/metrics.csv when set
    pub metrics_dir: Option<String>,
}

pub struct EvaluateUseCase {
    config: EvaluateConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvaluateConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<EvalMetrics> {
        let cfg = &self.config;

        let store = DatasetStore::open(&cfg.store)?;
        let ids   = cfg.ids.clone().unwrap_or_else(|| store.ids().to_vec());

        let vectorized = load_vectors(&store, &ids, cfg.wpad, cfg.num_labels, None);
        let mut skipped = vectorized.skipped.len();
        let dataset = SampleDataset::from(vectorized);

        let predictions = load_predictions(&cfg.predictions)?;

        // Samples the model produced no scores for are skipped as well
        let mut reals = Vec::with_capacity(dataset.sample_count());
        let mut preds = Vec::with_capacity(dataset.sample_count());
        for sample in dataset.samples() {
            match predictions.get(&sample.id) {
                Some(p) => {
                    reals.push(sample.labels.clone());
                    preds.push(p.scores.clone());
                }
                None => {
                    tracing::warn!("No prediction for sample '{}'", sample.id);
                    skipped += 1;
                }
            }
        }

        let Some(one_error) = mean_one_error(&reals, &preds) else {
            bail!("No sample of '{}' could be scored", cfg.store);
        };

        let metrics = EvalMetrics::new(&cfg.language, reals.len(), skipped, one_error);
        tracing::info!(
            "{}: one-error {:.4} over {} samples ({} skipped)",
            metrics.language,
            metrics.one_error,
            metrics.samples,
            metrics.skipped
        );

        if let Some(dir) = &cfg.metrics_dir {
            MetricsLogger::new(dir)?.log(&metrics)?;
        }

        Ok(metrics)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::LabelMap;
    use std::collections::HashMap;

    fn fixture(dir: &std::path::Path) -> EvaluateConfig {
        let x = HashMap::from([
            ("a".to_string(), vec![1, 2, 3]),
            ("b".to_string(), vec![4]),
            ("c".to_string(), vec![5, 6]),
            ("d".to_string(), vec![7]),
        ]);
        let y = HashMap::from([
            ("a".to_string(), vec![1]),
            ("b".to_string(), vec![0, 2]),
            ("c".to_string(), vec![9]),
            ("d".to_string(), vec![2]),
        ]);
        let store = dir.join("test.parquet");
        DatasetStore::from_columns(x, y, LabelMap::new()).write(&store).unwrap();

        // "a" correct, "b" wrong, "c" out of range label, "d" no prediction
        let preds = dir.join("preds.json");
        std::fs::write(
            &preds,
            r#"{"a": {"scores": [0.1, 0.8, 0.1]}, "b": {"scores": [0.1, 0.8, 0.1]}}"#,
        )
        .unwrap();

        EvaluateConfig {
            store:       store.display().to_string(),
            predictions: preds.display().to_string(),
            language:    "english".into(),
            wpad:        4,
            num_labels:  3,
            ids:         None,
            metrics_dir: Some(dir.join("metrics").display().to_string()),
        }
    }

    #[test]
    fn test_evaluate_counts_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = fixture(dir.path());

        let m = EvaluateUseCase::new(cfg).execute().unwrap();
        assert_eq!(m.samples, 2);
        assert_eq!(m.skipped, 2);
        assert_eq!(m.one_error, 0.5);

        let csv = std::fs::read_to_string(dir.path().join("metrics/metrics.csv")).unwrap();
        assert!(csv.ends_with("english,2,2,0.500000\n"));
    }

    #[test]
    fn test_evaluate_selected_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = fixture(dir.path());
        cfg.ids = Some(vec!["a".into()]);
        cfg.metrics_dir = None;

        let m = EvaluateUseCase::new(cfg).execute().unwrap();
        assert_eq!((m.samples, m.skipped), (1, 0));
        assert_eq!(m.one_error, 0.0);
    }

    #[test]
    fn test_nothing_scored_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = fixture(dir.path());
        cfg.ids = Some(vec!["d".into()]);
        assert!(EvaluateUseCase::new(cfg).execute().is_err());
    }
}
