// ============================================================
// Layer 4 - Sequence and Label Vectorizer
// ============================================================
// Turns variable-length samples into fixed-shape model inputs.
//
// Token padding, two policies:
//
//   left-aligned (load_vectors), wpad = 5
//     [7, 3, 9]             → [7, 3, 9, 0, 0]
//     [1, 2, 3, 4, 5, 6, 7] → [1, 2, 3, 4, 5]      keeps the head
//
//   post-padded (load_vectors_bup), wpad = 5
//     [7, 3, 9]             → [7, 3, 9, 0, 0]
//     [1, 2, 3, 4, 5, 6, 7] → [3, 4, 5, 6, 7]      keeps the tail
//
// Labels: every label id becomes a one-hot row of width
// num_labels, and the rows are summed into one vector.
// load_vectors keeps the sums; load_vectors_bup clamps them to 1.
//
// Reference: Rust Book §8 (Vectors)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Result};
use thiserror::Error;

use crate::domain::{sample::VectorizedSample, traits::SampleSource};

/// Why a sample id was left out of a vectorized batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("no token ids for sample")]
    MissingTokens,

    #[error("no label ids for sample")]
    MissingLabels,

    #[error("label id {0} has no class index")]
    UnmappedLabel(u32),

    #[error("class index {class} is outside {num_labels} label classes")]
    ClassOutOfRange { class: usize, num_labels: usize },
}

/// Output of `load_vectors`: the samples that vectorized cleanly,
/// in request order, plus every id that did not.
#[derive(Debug, Clone, Default)]
pub struct Vectorized {
    pub samples: Vec<VectorizedSample>,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Copy `tokens` into a zero vector of length `wpad`.
/// Longer inputs keep their first `wpad` tokens.
pub fn pad_left_aligned(tokens: &[u32], wpad: usize) -> Vec<u32> {
    let mut padded = vec![0u32; wpad];
    let n = tokens.len().min(wpad);
    padded[..n].copy_from_slice(&tokens[..n]);
    padded
}

/// Zero-pad after the tokens up to `wpad`.
/// Longer inputs keep their last `wpad` tokens.
pub fn pad_post(tokens: &[u32], wpad: usize) -> Vec<u32> {
    let start = tokens.len().saturating_sub(wpad);
    let mut padded = tokens[start..].to_vec();
    padded.resize(wpad, 0);
    padded
}

/// Sum of one-hot rows, one row per class index.
/// Duplicate classes accumulate (a class listed twice holds 2.0).
pub fn multi_hot(classes: &[usize], num_labels: usize) -> Result<Vec<f32>, SkipReason> {
    let mut v = vec![0.0f32; num_labels];
    for &class in classes {
        let slot = v
            .get_mut(class)
            .ok_or(SkipReason::ClassOutOfRange { class, num_labels })?;
        *slot += 1.0;
    }
    Ok(v)
}

/// Clamp every entry above 1 back to 1.
pub fn clamp_binary(labels: &mut [f32]) {
    for v in labels.iter_mut().filter(|v| **v > 1.0) {
        *v = 1.0;
    }
}

/// Vectorize the samples named by `ids`.
///
/// Each id's tokens are padded with `pad_left_aligned`; its label
/// ids are mapped through `revids` (raw label id → class index,
/// identity when None) and summed with `multi_hot`.
///
/// An id that cannot be vectorized is not fatal: it is left out of
/// `samples`, recorded in `skipped`, and logged.
pub fn load_vectors<S, T>(
    source:     &S,
    ids:        &[T],
    wpad:       usize,
    num_labels: usize,
    revids:     Option<&[usize]>,
) -> Vectorized
where
    S: SampleSource + ?Sized,
    T: AsRef<str>,
{
    let mut out = Vectorized::default();

    for id in ids {
        let id = id.as_ref();
        match vectorize_one(source, id, wpad, num_labels, revids) {
            Ok(sample) => out.samples.push(sample),
            Err(reason) => {
                tracing::warn!("Skipping sample '{}': {}", id, reason);
                out.skipped.push((id.to_string(), reason));
            }
        }
    }

    tracing::debug!(
        "Vectorized {} samples ({} skipped, wpad={}, labels={})",
        out.samples.len(),
        out.skipped.len(),
        wpad,
        num_labels
    );
    out
}

fn vectorize_one<S: SampleSource + ?Sized>(
    source:     &S,
    id:         &str,
    wpad:       usize,
    num_labels: usize,
    revids:     Option<&[usize]>,
) -> Result<VectorizedSample, SkipReason> {
    let tokens = source.token_ids(id).ok_or(SkipReason::MissingTokens)?;
    let labels = source.label_ids(id).ok_or(SkipReason::MissingLabels)?;

    let classes = labels
        .iter()
        .map(|&label| match revids {
            Some(table) => table
                .get(label as usize)
                .copied()
                .ok_or(SkipReason::UnmappedLabel(label)),
            None => Ok(label as usize),
        })
        .collect::<Result<Vec<usize>, SkipReason>>()?;

    Ok(VectorizedSample::new(
        id,
        pad_left_aligned(tokens, wpad),
        multi_hot(&classes, num_labels)?,
    ))
}

/// Vectorize positionally paired columns: `x_ids[i]` goes with `y_ids[i]`.
///
/// Tokens are padded with `pad_post`, and label vectors are clamped
/// to binary so repeated label ids count once. Samples get their
/// position as id. Unlike `load_vectors`, any bad sample fails the call.
pub fn load_vectors_bup(
    x_ids:      &[Vec<u32>],
    y_ids:      &[Vec<u32>],
    wpad:       usize,
    num_labels: usize,
) -> Result<Vec<VectorizedSample>> {
    if x_ids.len() != y_ids.len() {
        bail!(
            "{} token sequences but {} label sequences",
            x_ids.len(),
            y_ids.len()
        );
    }

    x_ids
        .iter()
        .zip(y_ids)
        .enumerate()
        .map(|(i, (x, y))| -> Result<VectorizedSample> {
            let classes: Vec<usize> = y.iter().map(|&c| c as usize).collect();
            let mut labels = multi_hot(&classes, num_labels)
                .map_err(|e| anyhow::anyhow!("sample {i}: {e}"))?;
            clamp_binary(&mut labels);
            Ok(VectorizedSample::new(i.to_string(), pad_post(x, wpad), labels))
        })
        .collect()
}
