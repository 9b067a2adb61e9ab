// ============================================================
// Layer 5 - Prediction Export
// ============================================================
// Builds an inspectable record per test document:
//
//   "en_0": {
//     "text":      [["the", "central", "bank"], ...],  one list per sentence
//     "watts":     [[0.1, 0.7, 0.2], ...],            word attentions
//     "satts":     [0.8, 0.2],                         sentence attentions
//     "gold_tags": ["monetary policy"],
//     "tags":      [["monetary policy", "0.93"], ["banking", "0.41"]]
//   }
//
// Labels are stored as readable ids such as "812_77": the
// vocabulary ids of the label's words joined with '_'. Gold labels
// are decoded with the target language's tables, predicted labels
// with the source language's tables (the model's label space).
//
// Reference: serde_json crate documentation

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

use crate::data::store::LabelMap;
use crate::domain::language::language_code;

/// One exported test document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Decoded words, one inner list per sentence
    pub text: Vec<Vec<String>>,

    /// Word attentions, passed through from the model
    pub watts: Vec<Vec<f32>>,

    /// Sentence attentions, passed through from the model
    pub satts: Vec<f32>,

    /// Decoded gold labels
    pub gold_tags: Vec<String>,

    /// Top-k (label, score) pairs, highest score first
    pub tags: Vec<(String, String)>,
}

/// Everything the export reads. Per-language tables are indexed by
/// language position; per-example arrays by test document position.
#[derive(Debug, Clone, Copy)]
pub struct ExportInputs<'a> {
    /// Model scores per test document, one entry per label class
    pub preds: &'a [Vec<f32>],

    /// Word attentions per test document
    pub watts: &'a [Vec<Vec<f32>>],

    /// Sentence attentions per test document
    pub satts: &'a [Vec<f32>],

    /// Per language: documents → sentences → word ids
    pub docs: &'a [Vec<Vec<Vec<u32>>>],

    /// Per language: documents → gold label ids
    pub gold: &'a [Vec<Vec<u32>>],

    /// Per language vocabulary
    pub vocabs: &'a [Vec<String>],

    /// Per language label map
    pub labels: &'a [LabelMap],
}

/// Export the top-k predictions of every test document of `lang`.
///
/// `lang_idx` selects the target language's documents and tables,
/// `source_idx` the tables of the language whose label space the
/// scores are over. Keys are "<code>_<document index>".
pub fn export(
    lang:       &str,
    lang_idx:   usize,
    source_idx: usize,
    inputs:     &ExportInputs<'_>,
    top_k:      usize,
) -> Result<BTreeMap<String, ExportRecord>> {
    let code = language_code(lang)
        .ok_or_else(|| anyhow!("Unknown language '{lang}'"))?;

    let docs         = table(inputs.docs, lang_idx, "documents")?;
    let gold         = table(inputs.gold, lang_idx, "gold labels")?;
    let vocab        = table(inputs.vocabs, lang_idx, "vocabulary")?;
    let labels       = table(inputs.labels, lang_idx, "label map")?;
    let source_vocab = table(inputs.vocabs, source_idx, "vocabulary")?;
    let source_lbls  = table(inputs.labels, source_idx, "label map")?;

    let mut out = BTreeMap::new();

    for (i, doc) in docs.iter().enumerate() {
        let preds = example(inputs.preds, i, "predictions")?;
        let watts = example(inputs.watts, i, "word attentions")?;
        let satts = example(inputs.satts, i, "sentence attentions")?;

        let text = doc
            .iter()
            .map(|sentence| decode_words(vocab, sentence))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("document {i}"))?;

        let gold_tags = example(gold, i, "gold labels")?
            .iter()
            .map(|&y| decode_label(labels, vocab, y))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("gold labels of document {i}"))?;

        let tags = rank(preds)
            .into_iter()
            .take(top_k)
            .map(|y| -> Result<(String, String)> {
                let class = u32::try_from(y)?;
                Ok((decode_label(source_lbls, source_vocab, class)?, preds[y].to_string()))
            })
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("predicted labels of document {i}"))?;

        out.insert(
            format!("{code}_{i}"),
            ExportRecord {
                text,
                watts: watts.clone(),
                satts: satts.clone(),
                gold_tags,
                tags,
            },
        );
    }

    tracing::info!("Exported {} {} documents (top_k={})", out.len(), lang, top_k);
    Ok(out)
}

/// Write an export as pretty-printed JSON.
pub fn write_export(path: impl AsRef<Path>, export: &BTreeMap<String, ExportRecord>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(export)?;
    fs::write(path, json)
        .with_context(|| format!("Cannot write export to '{}'", path.display()))?;
    tracing::info!("Wrote export to '{}'", path.display());
    Ok(())
}

/// Class indices ordered by descending score (NaN last).
fn rank(scores: &[f32]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..scores.len()).collect();
    idx.sort_by(|&a, &b| {
        let (sa, sb) = (scores[a], scores[b]);
        match (sa.is_nan(), sb.is_nan()) {
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            _ => sb.total_cmp(&sa),
        }
    });
    idx
}

fn decode_words(vocab: &[String], ids: &[u32]) -> Result<Vec<String>> {
    ids.iter()
        .map(|&id| {
            vocab
                .get(id as usize)
                .cloned()
                .ok_or_else(|| anyhow!("word id {id} outside vocabulary of {}", vocab.len()))
        })
        .collect()
}

/// Readable id "12_45" → "word12 word45".
fn decode_label(labels: &LabelMap, vocab: &[String], label: u32) -> Result<String> {
    let readable = labels
        .get(&label)
        .ok_or_else(|| anyhow!("label id {label} not in label map"))?;

    let ids = readable
        .split('_')
        .map(|w| {
            w.parse::<u32>()
                .with_context(|| format!("malformed readable id '{readable}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(decode_words(vocab, &ids)?.join(" "))
}

fn table<'a, T>(tables: &'a [T], idx: usize, what: &str) -> Result<&'a T> {
    tables
        .get(idx)
        .ok_or_else(|| anyhow!("no {what} for language index {idx}"))
}

fn example<'a, T>(rows: &'a [T], i: usize, what: &str) -> Result<&'a T> {
    rows.get(i)
        .ok_or_else(|| anyhow!("missing {what} for document {i}"))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<String> {
        ["<pad>", "central", "bank", "rates", "policy", "sports"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn labels() -> LabelMap {
        LabelMap::from([
            (0, "1_2".to_string()),
            (1, "4".to_string()),
            (2, "5".to_string()),
        ])
    }

    struct Fixture {
        preds:  Vec<Vec<f32>>,
        watts:  Vec<Vec<Vec<f32>>>,
        satts:  Vec<Vec<f32>>,
        docs:   Vec<Vec<Vec<Vec<u32>>>>,
        gold:   Vec<Vec<Vec<u32>>>,
        vocabs: Vec<Vec<String>>,
        labels: Vec<LabelMap>,
    }

    impl Fixture {
        fn new(preds: Vec<Vec<f32>>) -> Self {
            Self {
                preds,
                watts:  vec![vec![vec![0.6, 0.4], vec![1.0, 0.0]]],
                satts:  vec![vec![0.7, 0.3]],
                docs:   vec![vec![vec![vec![1, 2], vec![3, 0]]]],
                gold:   vec![vec![vec![0]]],
                vocabs: vec![vocab()],
                labels: vec![labels()],
            }
        }

        fn inputs(&self) -> ExportInputs<'_> {
            ExportInputs {
                preds:  &self.preds,
                watts:  &self.watts,
                satts:  &self.satts,
                docs:   &self.docs,
                gold:   &self.gold,
                vocabs: &self.vocabs,
                labels: &self.labels,
            }
        }
    }

    #[test]
    fn test_top_k_tags_descending() {
        let fx  = Fixture::new(vec![vec![0.2, 0.9]]);
        let out = export("english", 0, 0, &fx.inputs(), 2).unwrap();

        let rec = &out["en_0"];
        assert_eq!(
            rec.tags,
            vec![
                ("policy".to_string(), "0.9".to_string()),
                ("central bank".to_string(), "0.2".to_string()),
            ]
        );
    }

    #[test]
    fn test_record_contents() {
        let fx  = Fixture::new(vec![vec![0.1, 0.3, 0.6]]);
        let out = export("english", 0, 0, &fx.inputs(), 1).unwrap();

        let rec = &out["en_0"];
        assert_eq!(rec.text, vec![vec!["central", "bank"], vec!["rates", "<pad>"]]);
        assert_eq!(rec.gold_tags, vec!["central bank"]);
        assert_eq!(rec.tags, vec![("sports".to_string(), "0.6".to_string())]);
        assert_eq!(rec.satts, vec![0.7, 0.3]);
        assert_eq!(rec.watts[0], vec![0.6, 0.4]);
    }

    #[test]
    fn test_top_k_larger_than_classes() {
        let fx  = Fixture::new(vec![vec![0.5, 0.1, 0.4]]);
        let out = export("english", 0, 0, &fx.inputs(), 20).unwrap();
        assert_eq!(out["en_0"].tags.len(), 3);
    }

    #[test]
    fn test_unknown_language_fails() {
        let fx = Fixture::new(vec![vec![0.5, 0.5]]);
        assert!(export("elvish", 0, 0, &fx.inputs(), 2).is_err());
    }

    #[test]
    fn test_missing_predictions_fail() {
        let fx = Fixture::new(vec![]);
        assert!(export("english", 0, 0, &fx.inputs(), 2).is_err());
    }

    #[test]
    fn test_unknown_predicted_label_fails() {
        // class 3 has no entry in the label map
        let fx = Fixture::new(vec![vec![0.1, 0.1, 0.1, 0.9]]);
        assert!(export("english", 0, 0, &fx.inputs(), 1).is_err());
    }

    #[test]
    fn test_rank_puts_nan_last() {
        assert_eq!(rank(&[0.3, f32::NAN, 0.8]), vec![2, 0, 1]);
    }

    #[test]
    fn test_write_export() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let fx   = Fixture::new(vec![vec![0.2, 0.9]]);
        let out  = export("english", 0, 0, &fx.inputs(), 1).unwrap();

        write_export(&path, &out).unwrap();
        let back: BTreeMap<String, ExportRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, out);
    }
}
