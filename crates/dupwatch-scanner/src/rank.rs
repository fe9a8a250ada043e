//! Similarity ranking: cosine scores and threshold filtering.

use std::cmp::Ordering;

use dupwatch_core::{Error, Match, Result};

/// A transient pairing of an item key with its embedding, produced during
/// one scan pass.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub key: String,
    pub embedding: Vec<f32>,
}

/// Cosine similarity of two equal-length vectors, clamped to [0, 1].
///
/// A zero-magnitude vector yields 0.0 rather than an error, and any
/// non-finite intermediate result is coerced to 0.0. Mismatched lengths are
/// a programming error and raised.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut mag_a = 0.0f64;
    let mut mag_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    if mag_a == 0.0 || mag_b == 0.0 {
        return Ok(0.0);
    }

    let sim = dot / (mag_a.sqrt() * mag_b.sqrt());
    if !sim.is_finite() {
        return Ok(0.0);
    }
    Ok(sim.clamp(0.0, 1.0) as f32)
}

/// Score `candidates` against `source` and keep those strictly above
/// `threshold`, sorted descending by score (ties keep source order).
///
/// Candidates whose vector length differs from the source are skipped, never
/// compared. An empty source vector is invalid input.
pub fn find_top_matches(
    source: &[f32],
    candidates: &[Candidate],
    threshold: f32,
) -> Result<Vec<Match>> {
    if source.is_empty() {
        return Err(Error::InvalidInput("source vector must not be empty".into()));
    }

    let mut results = Vec::new();
    for candidate in candidates {
        if candidate.embedding.len() != source.len() {
            continue;
        }
        let score = cosine_similarity(source, &candidate.embedding)?;
        if score > threshold {
            results.push(Match {
                key: candidate.key.clone(),
                score,
            });
        }
    }

    // sort_by is stable, so equal scores preserve candidate order.
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(key: &str, embedding: Vec<f32>) -> Candidate {
        Candidate {
            key: key.to_string(),
            embedding,
        }
    }

    // ==========================================================================
    // Cosine similarity
    // ==========================================================================

    #[test]
    fn test_identical_vectors_score_one() {
        let v = vec![0.3, -0.2, 0.9, 0.01];
        assert_eq!(cosine_similarity(&v, &v).unwrap(), 1.0);
    }

    #[test]
    fn test_orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_parallel_unit_vectors_score_one() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_zero_magnitude_scores_zero() {
        let result = cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap();
        assert_eq!(result, 0.0);
        assert!(!result.is_nan());
    }

    #[test]
    fn test_both_zero_magnitude_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_negative_correlation_clamped_to_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let err = cosine_similarity(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_result_in_unit_range() {
        let a = vec![0.9, 0.1, 0.4];
        let b = vec![0.8, 0.2, 0.5];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((0.0..=1.0).contains(&sim));
    }

    // ==========================================================================
    // Top-match filtering
    // ==========================================================================

    #[test]
    fn test_filters_below_threshold_and_sorts_descending() {
        // Scores against [1, 0]: 0.9, 0.5, 0.3.
        let source = vec![1.0, 0.0];
        let candidates = vec![
            candidate("MID", vec![0.5, 0.866_025_4]),
            candidate("HIGH", vec![0.9, 0.435_889_9]),
            candidate("LOW", vec![0.3, 0.953_939_2]),
        ];

        let matches = find_top_matches(&source, &candidates, 0.4).unwrap();
        let keys: Vec<&str> = matches.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["HIGH", "MID"]);
        assert!((matches[0].score - 0.9).abs() < 1e-6);
        assert!((matches[1].score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_is_strict() {
        let source = vec![1.0, 0.0];
        // Exactly at threshold: excluded.
        let candidates = vec![candidate("AT", vec![0.4, 0.916_515_1])];
        let matches = find_top_matches(&source, &candidates, 0.4).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_mismatched_length_candidates_skipped() {
        let source = vec![1.0, 0.0];
        let candidates = vec![
            candidate("BAD", vec![1.0, 0.0, 0.0]),
            candidate("GOOD", vec![1.0, 0.0]),
        ];

        let matches = find_top_matches(&source, &candidates, 0.4).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].key, "GOOD");
    }

    #[test]
    fn test_ties_preserve_source_order() {
        let source = vec![1.0, 0.0];
        let candidates = vec![
            candidate("FIRST", vec![1.0, 0.0]),
            candidate("SECOND", vec![2.0, 0.0]),
        ];

        let matches = find_top_matches(&source, &candidates, 0.4).unwrap();
        assert_eq!(matches[0].key, "FIRST");
        assert_eq!(matches[1].key, "SECOND");
    }

    #[test]
    fn test_empty_source_is_invalid_input() {
        let err = find_top_matches(&[], &[], 0.4).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_empty_candidates_yield_empty() {
        let matches = find_top_matches(&[1.0], &[], 0.4).unwrap();
        assert!(matches.is_empty());
    }
}
