pub mod proficiency;
pub mod selector;
pub mod tiers;

// Re-export the main types for convenience
pub use proficiency::{estimate_proficiency, ProficiencyEstimate};
pub use selector::{
    select_next_question, select_random_question, AdaptiveSelector, QuestionSelector,
    RandomSelector, SelectError, SelectionMode,
};
pub use tiers::{target_tier, widening_order};

/// Fallback answer-time budget when a tier has no configured budget.
pub const DEFAULT_TIME_BUDGET_SECS: u32 = 150;

/// Tunable policy knobs for adaptive selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorOptions {
    /// How many of the most recent attempts carry weight in the estimate.
    pub recent_window: usize,
    /// Ordered boundaries partitioning the [0, 1] score range into tiers.
    /// Lower bound inclusive: a score equal to a boundary maps to the
    /// tier above it.
    pub tier_thresholds: Vec<f64>,
    /// Expected answer time per tier, indexed by tier - 1.
    pub time_budget_secs: Vec<u32>,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            recent_window: 10,
            tier_thresholds: vec![0.2, 0.4, 0.6, 0.8],
            time_budget_secs: vec![DEFAULT_TIME_BUDGET_SECS; 5],
        }
    }
}

impl SelectorOptions {
    pub fn time_budget_for(&self, tier: u8) -> u32 {
        tier.checked_sub(1)
            .and_then(|i| self.time_budget_secs.get(i as usize))
            .copied()
            .unwrap_or(DEFAULT_TIME_BUDGET_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::AttemptRecord;
    use crate::catalog::Question;
    use chrono::Local;

    fn question(id: &str, tier: u8) -> Question {
        Question {
            id: id.to_string(),
            tier,
            prompt: format!("prompt {id}"),
            choices: vec![],
            answer: "A".to_string(),
            category: None,
        }
    }

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
    fn test_estimate_feeds_tier_mapping() {
        let options = SelectorOptions::default();

        // A run of quick correct answers should push the target to the
        // top tier; a run of misses should drop it to the bottom.
        let strong: Vec<AttemptRecord> =
            (0..10).map(|i| attempt(&format!("q{i}"), 3, true, 20)).collect();
        let weak: Vec<AttemptRecord> =
            (0..10).map(|i| attempt(&format!("q{i}"), 3, false, 20)).collect();

        let strong_tier = target_tier(
            estimate_proficiency(&strong, &options).score,
            &options.tier_thresholds,
        );
        let weak_tier = target_tier(
            estimate_proficiency(&weak, &options).score,
            &options.tier_thresholds,
        );

        assert_eq!(strong_tier, 5);
        assert_eq!(weak_tier, 1);
    }

    #[test]
    fn test_single_correct_answer_reaches_for_harder_questions() {
        // catalog = {q1: tier 1, q2: tier 1, q3: tier 2}, history = [q1 correct].
        // The estimate rises above the cold-start default, the mapped tier is
        // absent from the catalog, and widening lands on q3 in tier 2.
        let catalog = vec![question("q1", 1), question("q2", 1), question("q3", 2)];
        let history = vec![attempt("q1", 1, true, 30)];

        let picked = select_next_question(&history, &catalog, &SelectorOptions::default()).unwrap();
        assert_eq!(picked.id, "q3");
    }

    #[test]
    fn test_time_budget_fallback() {
        let options = SelectorOptions {
            time_budget_secs: vec![60, 90],
            ..Default::default()
        };
        assert_eq!(options.time_budget_for(1), 60);
        assert_eq!(options.time_budget_for(2), 90);
        assert_eq!(options.time_budget_for(7), DEFAULT_TIME_BUDGET_SECS);
    }
}
