// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Appends one CSV row per evaluated language.
//
// Columns:
//   - language:  language name of the test set
//   - samples:   samples that vectorized and were scored
//   - skipped:   sample ids left out by the vectorizer
//   - one_error: mean one-error over the scored samples
//
// Output file: <dir>/metrics.csv
//
// Example CSV output:
//   language,samples,skipped,one_error
//   english,9873,2,0.214600
//   german,10112,0,0.231800
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

/// One row of evaluation metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub language: String,

    pub samples: usize,

    pub skipped: usize,

    /// Range: [0.0, 1.0], lower is better
    pub one_error: f64,
}

impl EvalMetrics {
    pub fn new(language: impl Into<String>, samples: usize, skipped: usize, one_error: f64) -> Self {
        Self { language: language.into(), samples, skipped, one_error }
    }

    /// Fraction of requested ids that were skipped
    pub fn skip_rate(&self) -> f64 {
        let total = self.samples + self.skipped;
        if total == 0 { 0.0 } else { self.skipped as f64 / total as f64 }
    }
}

/// Logs evaluation metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics dir '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "language,samples,skipped,one_error")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one row, keeping earlier rows.
    pub fn log(&self, m: &EvalMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{},{},{},{:.6}", m.language, m.samples, m.skipped, m.one_error)?;

        tracing::debug!(
            "Logged {} metrics: one_error={:.4} ({} samples, {} skipped)",
            m.language,
            m.one_error,
            m.samples,
            m.skipped,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_rate() {
        assert_eq!(EvalMetrics::new("english", 3, 1, 0.2).skip_rate(), 0.25);
        assert_eq!(EvalMetrics::new("english", 0, 0, 0.0).skip_rate(), 0.0);
    }

    #[test]
    fn test_rows_append_under_one_header() {
        let dir = tempfile::tempdir().unwrap();

        MetricsLogger::new(dir.path()).unwrap()
            .log(&EvalMetrics::new("english", 10, 0, 0.25)).unwrap();
        // A second logger on the same dir must not rewrite the header
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EvalMetrics::new("german", 8, 2, 0.5)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(
            csv,
            "language,samples,skipped,one_error\n\
             english,10,0,0.250000\n\
             german,8,2,0.500000\n"
        );
    }
}
