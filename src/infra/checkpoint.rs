// ============================================================
// Layer 6 - Checkpoint Directory
// ============================================================
// An experiment folder written by the training driver:
//
//   experiment/
//     args.json                ← model arguments of the run
//     val_1.txt                ← "<epoch> <score> ..." per epoch
//     val_2.txt
//     weights_01-0.4412.h5     ← weights after epoch 1
//     weights_02-0.4015.h5     ← weights after epoch 2
//     ...
//
// Naming rules:
//   - a name containing "val" is a validation-score file; the
//     score is the second whitespace-separated token of its text
//   - a name containing "weights" is a weights file; the epoch
//     sits between the first '_' and the following '-'
//
// Both lists are ordered by file name (numbers compared
// numerically) and paired by position: the i-th score belongs
// to the i-th weights file.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{anyhow, bail, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::infra::config::ModelArgs;

/// The checkpoint with the highest validation score.
#[derive(Debug, Clone, PartialEq)]
pub struct BestCheckpoint {
    pub epoch: u32,
    pub path:  PathBuf,
    pub score: f64,
}

/// Reads an experiment folder.
pub struct CheckpointDir {
    dir: PathBuf,
}

impl CheckpointDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Pick the weights file whose paired validation score is highest.
    /// The first maximum wins on ties.
    pub fn pick_best(&self) -> Result<BestCheckpoint> {
        let names = list_names(&self.dir)?;

        let val_files: Vec<&String>     = names.iter().filter(|n| n.contains("val")).collect();
        let weights_files: Vec<&String> = names.iter().filter(|n| n.contains("weights")).collect();

        let mut scores = Vec::with_capacity(val_files.len());
        for name in &val_files {
            scores.push(read_score(&self.dir.join(name))?);
        }

        // Diverged runs write nan or inf; those epochs never win
        let (best_idx, &score) = scores
            .iter()
            .enumerate()
            .filter(|(i, s)| {
                if !s.is_finite() {
                    tracing::warn!("Ignoring non-finite score {} in '{}'", s, val_files[*i]);
                }
                s.is_finite()
            })
            .fold(None, |best: Option<(usize, &f64)>, (i, s)| match best {
                Some((_, b)) if s <= b => best,
                _ => Some((i, s)),
            })
            .ok_or_else(|| anyhow!("No finite validation score in '{}'", self.dir.display()))?;

        let weights = weights_files.get(best_idx).ok_or_else(|| {
            anyhow!(
                "Best score is validation file #{} but '{}' has only {} weights files",
                best_idx + 1,
                self.dir.display(),
                weights_files.len()
            )
        })?;

        let epoch = parse_epoch(weights)?;
        let path  = self.dir.join(weights);

        tracing::info!("Loading best model (e={}, ap={:.3})...", epoch, score);
        tracing::info!("{}", path.display());

        Ok(BestCheckpoint { epoch, path, score })
    }

    /// Load the model arguments saved next to the checkpoints.
    pub fn load_args(&self) -> Result<ModelArgs> {
        let path = self.dir.join("args.json");

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read model args from '{}'", path.display()))?;

        serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a JSON object", path.display()))
    }

    /// Save model arguments as pretty JSON, creating the folder if needed.
    pub fn save_args(&self, args: &ModelArgs) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.dir.join("args.json");
        fs::write(&path, serde_json::to_string_pretty(args)?)
            .with_context(|| format!("Cannot write model args to '{}'", path.display()))?;

        tracing::debug!("Saved model args to '{}'", path.display());
        Ok(())
    }
}

/// Pick the best checkpoint of `dev_path`: (epoch, weights path).
pub fn pick_best(dev_path: impl Into<PathBuf>) -> Result<(u32, PathBuf)> {
    let best = CheckpointDir::new(dev_path).pick_best()?;
    Ok((best.epoch, best.path))
}

/// File names of a directory, in natural order.
fn list_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort_by(|a, b| natural_key(a).cmp(&natural_key(b)));
    Ok(names)
}

/// (first number in the name, name). Names without digits sort first.
fn natural_key(name: &str) -> (Option<u64>, &str) {
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    (digits.parse().ok(), name)
}

fn read_score(path: &Path) -> Result<f64> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;

    let token = text
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow!("'{}' has no score token", path.display()))?;

    token
        .parse::<f64>()
        .with_context(|| format!("'{}' holds non-numeric score '{}'", path.display(), token))
}

/// "weights_07-0.4410.h5" → 7
fn parse_epoch(name: &str) -> Result<u32> {
    let Some(field) = name.split('_').nth(1) else {
        bail!("weights file '{name}' has no '_<epoch>' part");
    };
    let epoch = field.split('-').next().unwrap_or(field);
    epoch
        .parse::<u32>()
        .with_context(|| format!("weights file '{name}' has non-numeric epoch '{epoch}'"))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn experiment(scores: &[f64]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (i, s) in scores.iter().enumerate() {
            let epoch = i + 1;
            fs::write(dir.path().join(format!("val_{epoch}.txt")), format!("{epoch} {s}\n")).unwrap();
            fs::write(dir.path().join(format!("weights_{epoch:02}-0.5.h5")), b"").unwrap();
        }
        dir
    }

    #[test]
    fn test_picks_highest_score() {
        let dir = experiment(&[0.70, 0.85, 0.60]);
        let (epoch, path) = pick_best(dir.path()).unwrap();
        assert_eq!(epoch, 2);
        assert_eq!(path, dir.path().join("weights_02-0.5.h5"));
    }

    #[test]
    fn test_numeric_order_past_ten_epochs() {
        let mut scores = vec![0.1; 12];
        scores[10] = 0.9;
        let dir  = experiment(&scores);
        let best = CheckpointDir::new(dir.path()).pick_best().unwrap();
        assert_eq!(best.epoch, 11);
        assert_eq!(best.score, 0.9);
    }

    #[test]
    fn test_ties_pick_first() {
        let dir = experiment(&[0.5, 0.5]);
        assert_eq!(pick_best(dir.path()).unwrap().0, 1);
    }

    #[test]
    fn test_nan_score_never_wins() {
        let dir = experiment(&[0.70, 0.85, f64::NAN]);
        let best = CheckpointDir::new(dir.path()).pick_best().unwrap();
        assert_eq!(best.epoch, 2);
        assert_eq!(best.score, 0.85);
    }

    #[test]
    fn test_infinite_score_ignored() {
        let dir = experiment(&[f64::INFINITY, 0.4]);
        assert_eq!(pick_best(dir.path()).unwrap().0, 2);
    }

    #[test]
    fn test_only_nan_scores_fails() {
        let dir = experiment(&[f64::NAN, f64::NAN]);
        assert!(pick_best(dir.path()).is_err());
    }

    #[test]
    fn test_no_scores_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("weights_01-0.5.h5"), b"").unwrap();
        assert!(pick_best(dir.path()).is_err());
    }

    #[test]
    fn test_missing_weights_fails() {
        let dir = experiment(&[0.1, 0.9]);
        fs::remove_file(dir.path().join("weights_02-0.5.h5")).unwrap();
        assert!(pick_best(dir.path()).is_err());
    }

    #[test]
    fn test_malformed_score_fails() {
        let dir = experiment(&[0.3]);
        fs::write(dir.path().join("val_1.txt"), "only").unwrap();
        assert!(pick_best(dir.path()).is_err());
    }

    #[test]
    fn test_parse_epoch() {
        assert_eq!(parse_epoch("weights_07-0.4410.h5").unwrap(), 7);
        assert_eq!(parse_epoch("weights_12").unwrap(), 12);
        assert!(parse_epoch("weights.h5").is_err());
        assert!(parse_epoch("weights_x-1.h5").is_err());
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(pick_best(dir.path().join("gone")).is_err());
    }

    #[test]
    fn test_args_roundtrip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointDir::new(dir.path().join("exp"));
        let mut args = ModelArgs::new();
        args.insert("languages".into(), json!(["english", "german"]));
        args.insert("wpad".into(), json!(30));

        ckpt.save_args(&args).unwrap();
        assert_eq!(ckpt.load_args().unwrap(), args);
    }
}
