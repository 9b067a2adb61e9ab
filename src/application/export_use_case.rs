// ============================================================
// Layer 2 - Export Use Case
// ============================================================
// Exports a model's top-k predictions for one test store:
//
//   Step 1: Open the target store (and the source store, whose
//           label space the model predicts over)
//   Step 2: Load both languages' word vectors
//   Step 3: Vectorize the test ids and split into sentences
//   Step 4: Line up scores and attentions by sample id
//   Step 5: Build and write the export JSON
//
// Without a source language the target language's own store
// and vectors decode the predicted labels.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    embeddings::load_word_vectors,
    predictions::load_predictions,
    store::DatasetStore,
    vectorizer::load_vectors,
};
use crate::eval::export::{export, write_export, ExportInputs};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub language:           String,
    pub store:              String,
    pub vectors:            String,
    pub predictions:        String,
    pub out:                String,
    pub wpad:               usize,
    pub words_per_sentence: usize,
    pub num_labels:         usize,
    pub top_k:              usize,
    pub source:             Option<SourceLanguage>,
}

/// The language whose label space the model was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceLanguage {
    pub language: String,
    pub store:    String,
    pub vectors:  String,
}

pub struct ExportUseCase {
    config: ExportConfig,
}

impl ExportUseCase {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Run the export and return the number of exported documents.
    pub fn execute(&self) -> Result<usize> {
        let cfg = &self.config;

        // ── Step 1 + 2: per-language tables, target first ─────────────────────
        let target_store = DatasetStore::open(&cfg.store)?;
        let mut vocabs   = vec![vocab_of(&cfg.language, &cfg.vectors)?];
        let mut labels   = vec![target_store.label_map().clone()];

        let source_idx = match &cfg.source {
            Some(src) => {
                let source_store = DatasetStore::open(&src.store)?;
                vocabs.push(vocab_of(&src.language, &src.vectors)?);
                labels.push(source_store.label_map().clone());
                1
            }
            None => 0,
        };

        // ── Step 3: vectorize and split into sentences ────────────────────────
        let vectorized = load_vectors(
            &target_store,
            target_store.ids(),
            cfg.wpad,
            cfg.num_labels,
            None,
        );

        // ── Step 4: keep samples the model scored ─────────────────────────────
        let predictions = load_predictions(&cfg.predictions)?;

        let mut docs  = Vec::new();
        let mut gold  = Vec::new();
        let mut preds = Vec::new();
        let mut watts = Vec::new();
        let mut satts = Vec::new();

        for sample in &vectorized.samples {
            let Some(p) = predictions.get(&sample.id) else {
                tracing::warn!("No prediction for sample '{}'", sample.id);
                continue;
            };
            docs.push(sample.sentences(cfg.words_per_sentence));
            gold.push(
                target_store
                    .y_ids()
                    .get(&sample.id)
                    .cloned()
                    .unwrap_or_default(),
            );
            preds.push(p.scores.clone());
            watts.push(p.watts.clone());
            satts.push(p.satts.clone());
        }

        // ── Step 5: export ────────────────────────────────────────────────────
        // Per-language slots the source language does not use stay empty
        let mut all_docs = vec![docs];
        let mut all_gold = vec![gold];
        if source_idx == 1 {
            all_docs.push(Vec::new());
            all_gold.push(Vec::new());
        }

        let inputs = ExportInputs {
            preds:  &preds,
            watts:  &watts,
            satts:  &satts,
            docs:   &all_docs,
            gold:   &all_gold,
            vocabs: &vocabs,
            labels: &labels,
        };

        let out = export(&cfg.language, 0, source_idx, &inputs, cfg.top_k)?;
        write_export(&cfg.out, &out)?;
        Ok(out.len())
    }
}

fn vocab_of(language: &str, path: &str) -> Result<Vec<String>> {
    load_word_vectors(language, path)?
        .remove(language)
        .map(|table| table.vocab)
        .ok_or_else(|| anyhow!("No {language} word vectors in '{path}'"))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::embeddings::{save_word_vectors, WordVectors};
    use crate::data::store::LabelMap;
    use crate::eval::export::ExportRecord;
    use std::collections::{BTreeMap, HashMap};

    fn write_language(dir: &std::path::Path, name: &str, vocab: &[&str]) -> (String, String) {
        let x = HashMap::from([("0".to_string(), vec![1, 2, 3])]);
        let y = HashMap::from([("0".to_string(), vec![1])]);
        let labels = LabelMap::from([(0, "1".to_string()), (1, "2_3".to_string())]);

        let store = dir.join(format!("{name}.parquet"));
        DatasetStore::from_columns(x, y, labels).write(&store).unwrap();

        let rows  = vec![vec![0.0; 2]; vocab.len()];
        let table = WordVectors::from_rows(rows, vocab.iter().map(|s| s.to_string()).collect()).unwrap();
        let vecs  = dir.join(format!("{name}.bin"));
        save_word_vectors(&table, &vecs).unwrap();

        (store.display().to_string(), vecs.display().to_string())
    }

    fn config(dir: &std::path::Path) -> ExportConfig {
        let (store, vectors) = write_language(dir, "german", &["<pad>", "zentral", "bank", "zins"]);

        let preds = dir.join("preds.json");
        std::fs::write(
            &preds,
            r#"{"0": {"scores": [0.3, 0.7], "watts": [[0.5, 0.5], [1.0, 0.0]], "satts": [0.9, 0.1]}}"#,
        )
        .unwrap();

        ExportConfig {
            language:           "german".into(),
            store,
            vectors,
            predictions:        preds.display().to_string(),
            out:                dir.join("out.json").display().to_string(),
            wpad:               4,
            words_per_sentence: 2,
            num_labels:         2,
            top_k:              2,
            source:             None,
        }
    }

    fn read_out(cfg: &ExportConfig) -> BTreeMap<String, ExportRecord> {
        serde_json::from_str(&std::fs::read_to_string(&cfg.out).unwrap()).unwrap()
    }

    #[test]
    fn test_export_target_only() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());

        assert_eq!(ExportUseCase::new(cfg.clone()).execute().unwrap(), 1);

        let out = read_out(&cfg);
        let rec = &out["de_0"];
        assert_eq!(rec.text, vec![vec!["zentral", "bank"], vec!["zins", "<pad>"]]);
        assert_eq!(rec.gold_tags, vec!["bank zins"]);
        assert_eq!(rec.tags[0], ("bank zins".to_string(), "0.7".to_string()));
        assert_eq!(rec.satts, vec![0.9, 0.1]);
    }

    #[test]
    fn test_export_with_source_language() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        let (store, vectors) = write_language(dir.path(), "english", &["<pad>", "central", "bank", "rates"]);
        cfg.source = Some(SourceLanguage { language: "english".into(), store, vectors });

        ExportUseCase::new(cfg.clone()).execute().unwrap();

        let out = read_out(&cfg);
        let rec = &out["de_0"];
        // Gold labels decode in German, predictions in English
        assert_eq!(rec.gold_tags, vec!["bank zins"]);
        assert_eq!(rec.tags[0].0, "bank rates");
        assert_eq!(rec.tags[1].0, "central");
    }
}
