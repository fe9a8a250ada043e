//! Verdict tiering: maps a similarity score (and optionally a judge verdict)
//! to a final duplicate decision.
//!
//! Three tiers bound the number of costly judge calls to the ambiguous
//! middle band:
//! - score > 0.85: auto-accept, the judge is never invoked,
//! - 0.4 < score <= 0.85: defer to the judge,
//! - score <= 0.4: already discarded upstream by the ranker's threshold.

use std::future::Future;

use tracing::{debug, warn};

use dupwatch_core::{defaults, Result, Verdict};

/// Reason attached to auto-accepted high-similarity matches.
pub const AUTO_ACCEPT_REASON: &str = "high vector match, auto-verified";

/// Reason attached when the judge call failed but the vector score alone
/// is strong enough to confirm.
pub const JUDGE_FALLBACK_REASON: &str = "vector match (judge unavailable)";

/// Confidence derived purely from a similarity score.
pub fn score_confidence(score: f32) -> u8 {
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

/// The verdict for an auto-accepted match.
pub fn auto_verdict(score: f32) -> Verdict {
    Verdict {
        is_duplicate: true,
        confidence: score_confidence(score),
        reason: AUTO_ACCEPT_REASON.to_string(),
    }
}

/// Resolve one match to a confirmed verdict, or `None` to skip it.
///
/// `judge` is only awaited in the deferred band. A judge confirmation with
/// confidence 0 surfaces the score-derived confidence instead. A judge
/// transport failure falls back to the vector score when it exceeds
/// [`defaults::JUDGE_FALLBACK_THRESHOLD`], otherwise the match is skipped.
pub async fn resolve<F, Fut>(score: f32, judge: F) -> Option<Verdict>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Verdict>>,
{
    if score > defaults::AUTO_ACCEPT_THRESHOLD {
        debug!(
            subsystem = "scanner",
            component = "tiering",
            score,
            "Auto-accepting high vector match"
        );
        return Some(auto_verdict(score));
    }

    match judge().await {
        Ok(verdict) if verdict.is_duplicate => {
            let confidence = if verdict.confidence == 0 {
                score_confidence(score)
            } else {
                verdict.confidence
            };
            Some(Verdict {
                confidence,
                ..verdict
            })
        }
        Ok(_) => None,
        Err(e) => {
            if score > defaults::JUDGE_FALLBACK_THRESHOLD {
                warn!(
                    subsystem = "scanner",
                    component = "tiering",
                    score,
                    error = %e,
                    "Judge failed, confirming on vector score alone"
                );
                Some(Verdict {
                    is_duplicate: true,
                    confidence: score_confidence(score),
                    reason: JUDGE_FALLBACK_REASON.to_string(),
                })
            } else {
                warn!(
                    subsystem = "scanner",
                    component = "tiering",
                    score,
                    error = %e,
                    "Judge failed, skipping match"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dupwatch_core::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn confirming_verdict(confidence: u8) -> Verdict {
        Verdict {
            is_duplicate: true,
            confidence,
            reason: "same bug".to_string(),
        }
    }

    #[tokio::test]
    async fn test_high_score_auto_accepts_without_judge() {
        let calls = AtomicUsize::new(0);
        let verdict = resolve(0.90, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(confirming_verdict(50)) }
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(verdict.is_duplicate);
        assert_eq!(verdict.confidence, 90);
        assert_eq!(verdict.reason, AUTO_ACCEPT_REASON);
    }

    #[tokio::test]
    async fn test_middle_score_invokes_judge_exactly_once() {
        let calls = AtomicUsize::new(0);
        let verdict = resolve(0.50, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(confirming_verdict(70)) }
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(verdict.confidence, 70);
        assert_eq!(verdict.reason, "same bug");
    }

    #[tokio::test]
    async fn test_judge_rejection_skips_match() {
        let verdict = resolve(0.50, || async {
            Ok(Verdict {
                is_duplicate: false,
                confidence: 95,
                reason: "different features".to_string(),
            })
        })
        .await;

        assert!(verdict.is_none());
    }

    #[tokio::test]
    async fn test_judge_zero_confidence_falls_back_to_score() {
        let verdict = resolve(0.62, || async { Ok(confirming_verdict(0)) })
            .await
            .unwrap();
        assert_eq!(verdict.confidence, 62);
    }

    #[tokio::test]
    async fn test_judge_failure_above_fallback_threshold_confirms() {
        let verdict = resolve(0.75, || async { Err(Error::Inference("down".into())) })
            .await
            .unwrap();

        assert!(verdict.is_duplicate);
        assert_eq!(verdict.confidence, 75);
        assert_eq!(verdict.reason, JUDGE_FALLBACK_REASON);
    }

    #[tokio::test]
    async fn test_judge_failure_below_fallback_threshold_skips() {
        let verdict = resolve(0.55, || async { Err(Error::Inference("down".into())) }).await;
        assert!(verdict.is_none());
    }

    #[tokio::test]
    async fn test_boundary_at_auto_accept_threshold_defers() {
        // Exactly 0.85 is not auto-accepted.
        let calls = AtomicUsize::new(0);
        resolve(defaults::AUTO_ACCEPT_THRESHOLD, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(confirming_verdict(80)) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_score_confidence_rounds() {
        assert_eq!(score_confidence(0.954), 95);
        assert_eq!(score_confidence(0.956), 96);
        assert_eq!(score_confidence(1.0), 100);
        assert_eq!(score_confidence(0.0), 0);
    }
}
