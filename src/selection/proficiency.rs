use super::SelectorOptions;
use crate::attempt::AttemptRecord;

/// Score an attempt contributes when answered correctly at exactly the
/// tier's time budget.
const ON_BUDGET_SCORE: f64 = 0.8;
/// How much a faster-than-budget answer can raise the per-attempt score
/// above `ON_BUDGET_SCORE` (up to 1.0 for an instant answer).
const FAST_SCALE: f64 = 0.2;
/// How quickly the score decays per budget-multiple overrun.
const SLOW_SCALE: f64 = 0.3;
/// A correct answer never scores below this, no matter how slow; an
/// incorrect answer always scores 0.
const SLOW_FLOOR: f64 = 0.5;
/// Cold-start estimate when there is no history at all.
const NEUTRAL_SCORE: f64 = 0.5;

/// A derived, ephemeral proficiency value in [0.0, 1.0].
///
/// Computed fresh on every selection request and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProficiencyEstimate {
    pub score: f64,
}

impl ProficiencyEstimate {
    pub fn neutral() -> Self {
        Self {
            score: NEUTRAL_SCORE,
        }
    }
}

/// Estimate proficiency from the most recent attempts.
///
/// Takes the last `recent_window` records (all of them if fewer exist) and
/// computes a recency-weighted correctness rate: the oldest in-window
/// attempt has weight 1, the newest weight n. Correct answers are adjusted
/// by how the answer time compares to the tier's budget; an incorrect
/// answer always contributes 0, so flipping any in-window attempt from
/// incorrect to correct can only raise the estimate.
///
/// An empty history yields the neutral mid-range estimate rather than an
/// error, so cold start needs no special-casing by callers.
pub fn estimate_proficiency(
    history: &[AttemptRecord],
    options: &SelectorOptions,
) -> ProficiencyEstimate {
    let window = options.recent_window.max(1);
    let start = history.len().saturating_sub(window);
    let recent = &history[start..];

    if recent.is_empty() {
        return ProficiencyEstimate::neutral();
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (i, record) in recent.iter().enumerate() {
        let weight = (i + 1) as f64;
        weighted_sum += weight * attempt_score(record, options);
        total_weight += weight;
    }

    ProficiencyEstimate {
        score: (weighted_sum / total_weight).clamp(0.0, 1.0),
    }
}

/// Per-attempt contribution in [0, 1].
fn attempt_score(record: &AttemptRecord, options: &SelectorOptions) -> f64 {
    if !record.correct {
        return 0.0;
    }

    let budget = options.time_budget_for(record.tier);
    if budget == 0 {
        return ON_BUDGET_SCORE;
    }

    let ratio = record.time_taken_secs as f64 / budget as f64;
    if ratio <= 1.0 {
        1.0 - FAST_SCALE * ratio
    } else {
        (ON_BUDGET_SCORE - SLOW_SCALE * (ratio - 1.0)).max(SLOW_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn attempt(id: &str, tier: u8, correct: bool, secs: u32) -> AttemptRecord {
        AttemptRecord {
            question_id: id.to_string(),
            tier,
            correct,
            time_taken_secs: secs,
            attempted_at: Local::now(),
        }
    }

    #[test]
    fn test_empty_history_is_neutral() {
        let estimate = estimate_proficiency(&[], &SelectorOptions::default());
        assert_eq!(estimate.score, 0.5);
    }

    #[test]
    fn test_all_incorrect_scores_zero() {
        let history: Vec<AttemptRecord> =
            (0..5).map(|i| attempt(&format!("q{i}"), 1, false, 10)).collect();
        let estimate = estimate_proficiency(&history, &SelectorOptions::default());
        assert_eq!(estimate.score, 0.0);
    }

    #[test]
    fn test_score_stays_in_bounds() {
        let fast_correct: Vec<AttemptRecord> =
            (0..20).map(|i| attempt(&format!("q{i}"), 5, true, 0)).collect();
        let estimate = estimate_proficiency(&fast_correct, &SelectorOptions::default());
        assert!(estimate.score <= 1.0);
        assert!(estimate.score >= 0.0);
        assert_eq!(estimate.score, 1.0);
    }

    #[test]
    fn test_recent_attempts_weigh_more() {
        let options = SelectorOptions::default();
        let miss_then_hit = vec![attempt("q1", 1, false, 30), attempt("q2", 1, true, 30)];
        let hit_then_miss = vec![attempt("q1", 1, true, 30), attempt("q2", 1, false, 30)];

        let rising = estimate_proficiency(&miss_then_hit, &options);
        let falling = estimate_proficiency(&hit_then_miss, &options);
        assert!(rising.score > falling.score);
    }

    #[test]
    fn test_flipping_incorrect_to_correct_never_lowers_estimate() {
        let options = SelectorOptions::default();
        for flip_at in 0..6 {
            let mut base: Vec<AttemptRecord> = (0..6)
                .map(|i| attempt(&format!("q{i}"), 2, i % 2 == 0, 200))
                .collect();
            let before = estimate_proficiency(&base, &options);

            base[flip_at].correct = true;
            let after = estimate_proficiency(&base, &options);
            assert!(
                after.score >= before.score,
                "flip at {flip_at} lowered {} -> {}",
                before.score,
                after.score
            );
        }
    }

    #[test]
    fn test_slow_correct_beats_incorrect_but_not_fast_correct() {
        let options = SelectorOptions::default();
        let slow = estimate_proficiency(&[attempt("q1", 1, true, 100_000)], &options);
        let fast = estimate_proficiency(&[attempt("q1", 1, true, 5)], &options);
        let miss = estimate_proficiency(&[attempt("q1", 1, false, 5)], &options);

        assert!(slow.score > miss.score);
        assert!(fast.score > slow.score);
        assert_eq!(slow.score, 0.5); // decays to the floor, never below
    }

    #[test]
    fn test_window_limits_lookback() {
        let options = SelectorOptions {
            recent_window: 3,
            ..Default::default()
        };

        // A long run of misses followed by three quick hits: only the hits
        // are inside the window.
        let mut history: Vec<AttemptRecord> =
            (0..10).map(|i| attempt(&format!("q{i}"), 1, false, 10)).collect();
        history.extend((10..13).map(|i| attempt(&format!("q{i}"), 1, true, 0)));

        let estimate = estimate_proficiency(&history, &options);
        assert_eq!(estimate.score, 1.0);
    }

    #[test]
    fn test_zero_budget_does_not_divide() {
        let options = SelectorOptions {
            time_budget_secs: vec![0],
            ..Default::default()
        };
        let estimate = estimate_proficiency(&[attempt("q1", 1, true, 10)], &options);
        assert!(estimate.score > 0.0 && estimate.score <= 1.0);
    }
}
