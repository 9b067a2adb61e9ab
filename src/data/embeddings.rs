// ============================================================
// Layer 4 - Word Vector Loader
// ============================================================
// Loads one language's pretrained word embeddings from a
// bincode blob holding the pair:
//
//   (vocabulary: Vec<String>, matrix: Vec<Vec<f32>>)
//
// Row i of the matrix is the vector of vocabulary[i], so word
// ids in the dataset store index both at once.
//
// Reference: bincode crate documentation
//            ndarray crate documentation

use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2, Axis};
use std::{collections::BTreeMap, fs, path::Path};

/// The on-disk layout of an embedding blob.
type EmbeddingBlob = (Vec<String>, Vec<Vec<f32>>);

/// A fixed-width embedding matrix plus its vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct WordVectors {
    /// Shape [vocab_size, dim]
    pub vectors: Array2<f32>,

    /// Surface form of every row
    pub vocab: Vec<String>,
}

impl WordVectors {
    /// Pair a matrix with its vocabulary.
    /// Fails if the row count and vocabulary size disagree.
    pub fn new(vectors: Array2<f32>, vocab: Vec<String>) -> Result<Self> {
        if vectors.nrows() != vocab.len() {
            bail!(
                "embedding matrix has {} rows but vocabulary has {} words",
                vectors.nrows(),
                vocab.len()
            );
        }
        Ok(Self { vectors, vocab })
    }

    /// Build from row vectors. All rows must share one width.
    pub fn from_rows(rows: Vec<Vec<f32>>, vocab: Vec<String>) -> Result<Self> {
        if rows.len() != vocab.len() {
            bail!(
                "embedding blob has {} rows but vocabulary has {} words",
                rows.len(),
                vocab.len()
            );
        }
        let dim = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
            bail!("row {} has width {} (expected {})", i, row.len(), dim);
        }
        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        let vectors = Array2::from_shape_vec((vocab.len(), dim), flat)
            .context("embedding matrix shape does not match vocabulary")?;
        Self::new(vectors, vocab)
    }

    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }
}

/// Load the word vectors of `language` from a bincode blob.
/// The result is keyed by the language tag.
pub fn load_word_vectors(
    language: &str,
    path:     impl AsRef<Path>,
) -> Result<BTreeMap<String, WordVectors>> {
    let path = path.as_ref();
    tracing::info!("Loading {} word vectors...", language);

    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read word vectors '{}'", path.display()))?;

    let (vocab, rows): EmbeddingBlob = bincode::deserialize(&bytes)
        .with_context(|| format!("Corrupt word-vector blob '{}'", path.display()))?;

    let table = WordVectors::from_rows(rows, vocab)
        .with_context(|| format!("Invalid word-vector table '{}'", path.display()))?;

    tracing::info!(
        "Loaded '{}' ({} words, dim {})",
        path.display(),
        table.len(),
        table.dim()
    );

    Ok(BTreeMap::from([(language.to_string(), table)]))
}

/// Write word vectors in the format `load_word_vectors` reads.
pub fn save_word_vectors(table: &WordVectors, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let rows: Vec<Vec<f32>> = table.vectors.outer_iter().map(|r| r.to_vec()).collect();
    let blob: EmbeddingBlob = (table.vocab.clone(), rows);

    let bytes = bincode::serialize(&blob)?;
    fs::write(path, bytes)
        .with_context(|| format!("Cannot write word vectors '{}'", path.display()))?;
    Ok(())
}

/// Average of the vectors of the first `wpad` ids.
/// Used to embed a label from the words of its description.
pub fn mean_vector(vectors: &Array2<f32>, ids: &[usize], wpad: usize) -> Result<Array1<f32>> {
    let ids = &ids[..ids.len().min(wpad)];
    if let Some(&bad) = ids.iter().find(|&&i| i >= vectors.nrows()) {
        bail!("word id {} outside embedding table of {} rows", bad, vectors.nrows());
    }
    vectors
        .select(Axis(0), ids)
        .mean_axis(Axis(0))
        .context("cannot average an empty word selection")
}
