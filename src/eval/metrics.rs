// ============================================================
// Layer 5 - One-Error Metric
// ============================================================
// One-error counts how often the single highest-scoring label
// is NOT one of the true labels:
//
//   preds [0.1, 0.9, 0.2]  reals [0, 1, 0]  → 0  (top label is true)
//   preds [0.9, 0.1, 0.2]  reals [0, 1, 0]  → 1  (top label is false)
//
// Averaged over a test set, lower is better.

/// Index of the first maximum of `scores`, or None when empty.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, s)| !s.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, s)| match best {
            Some((_, b)) if s <= b => best,
            _ => Some((i, s)),
        })
        .map(|(i, _)| i)
}

/// 0 if the arg-max of `preds` is a nonzero index of `reals`, else 1.
/// Empty predictions score 1.
pub fn one_error(reals: &[f32], preds: &[f32]) -> u8 {
    match argmax(preds) {
        Some(top) if reals.get(top).is_some_and(|&r| r != 0.0) => 0,
        _ => 1,
    }
}

/// Mean one-error over paired rows, or None for an empty set.
pub fn mean_one_error(reals: &[Vec<f32>], preds: &[Vec<f32>]) -> Option<f64> {
    let n = reals.len().min(preds.len());
    if n == 0 {
        return None;
    }
    let errors: u32 = reals
        .iter()
        .zip(preds)
        .map(|(r, p)| u32::from(one_error(r, p)))
        .sum();
    Some(f64::from(errors) / n as f64)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_label_correct() {
        assert_eq!(one_error(&[0.0, 1.0, 0.0], &[0.1, 0.9, 0.2]), 0);
    }

    #[test]
    fn test_top_label_wrong() {
        assert_eq!(one_error(&[0.0, 1.0, 0.0], &[0.9, 0.1, 0.2]), 1);
    }

    #[test]
    fn test_ties_use_first_maximum() {
        assert_eq!(argmax(&[0.5, 0.5, 0.1]), Some(0));
        assert_eq!(one_error(&[0.0, 1.0, 0.0], &[0.5, 0.5, 0.1]), 1);
    }

    #[test]
    fn test_empty_predictions() {
        assert_eq!(argmax(&[]), None);
        assert_eq!(one_error(&[1.0], &[]), 1);
    }

    #[test]
    fn test_nan_scores_are_ignored() {
        assert_eq!(argmax(&[f32::NAN, 0.2, 0.7]), Some(2));
    }

    #[test]
    fn test_counts_above_one_are_true_labels() {
        assert_eq!(one_error(&[0.0, 2.0], &[0.1, 0.8]), 0);
    }

    #[test]
    fn test_mean_one_error() {
        let reals = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let preds = vec![vec![0.2, 0.8], vec![0.3, 0.7]];
        assert_eq!(mean_one_error(&reals, &preds), Some(0.5));
        assert_eq!(mean_one_error(&[], &[]), None);
    }
}
