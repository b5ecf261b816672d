//! Top-k selection over a class-score vector.

/// Default number of ranked predictions callers usually ask for.
pub const DEFAULT_TOP_K: usize = 5;

/// Returns the indices and values of the `k` highest entries of `scores`,
/// ordered descending by value, length `min(k, scores.len())`.
///
/// Order among exactly-equal values is unspecified; NaN entries sort last.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();

    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or_else(|| a.1.is_nan().cmp(&b.1.is_nan()))
    });
    ranked.truncate(k.min(scores.len()));

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_orders_descending() {
        let scores = [0.1, 0.7, 0.2, 0.05];
        let ranked = top_k(&scores, 3);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0], (1, 0.7));
        assert_eq!(ranked[1], (2, 0.2));
        assert_eq!(ranked[2], (0, 0.1));
    }

    #[test]
    fn test_top_k_clamps_to_length() {
        let scores = [0.5, 0.5];
        let ranked = top_k(&scores, 10);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_top_k_empty() {
        let ranked = top_k(&[], 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_top_k_non_increasing_with_ties() {
        let scores = [0.3, 0.3, 0.3, 0.1];
        let ranked = top_k(&scores, 4);

        for pair in ranked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_top_k_nan_sorts_last() {
        let scores = [0.2, f32::NAN, 0.8];
        let ranked = top_k(&scores, 3);

        assert_eq!(ranked[0].0, 2);
        assert_eq!(ranked[1].0, 0);
        assert!(ranked[2].1.is_nan());
    }
}
