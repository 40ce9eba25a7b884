use super::{
    estimate_proficiency,
    tiers::{target_tier, widening_order},
    SelectorOptions,
};
use crate::attempt::AttemptRecord;
use crate::catalog::Question;
use log::debug;
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SelectError {
    /// The catalog has no entries at all. Partial exhaustion never raises;
    /// it is absorbed by the widening and least-recently-seen fallbacks.
    #[error("practice set has no questions")]
    EmptyCatalog,
}

/// How the next question is chosen.
#[derive(Debug, Copy, Clone, PartialEq, strum_macros::Display)]
pub enum SelectionMode {
    Adaptive,
    Random,
}

impl SelectionMode {
    pub fn selector(&self) -> Box<dyn QuestionSelector> {
        match self {
            SelectionMode::Adaptive => Box::new(AdaptiveSelector),
            SelectionMode::Random => Box::new(RandomSelector),
        }
    }
}

/// Trait for question selection strategies.
pub trait QuestionSelector {
    /// Select the next question from the catalog given the attempt history.
    fn select<'a>(
        &self,
        history: &[AttemptRecord],
        catalog: &'a [Question],
        options: &SelectorOptions,
    ) -> Result<&'a Question, SelectError>;
}

/// Proficiency-driven selection: estimate skill from recent attempts, map
/// it to a difficulty tier, and serve unseen questions from that tier.
///
/// Fully deterministic: repeated calls with identical inputs return the
/// same question.
pub struct AdaptiveSelector;

impl QuestionSelector for AdaptiveSelector {
    fn select<'a>(
        &self,
        history: &[AttemptRecord],
        catalog: &'a [Question],
        options: &SelectorOptions,
    ) -> Result<&'a Question, SelectError> {
        if catalog.is_empty() {
            return Err(SelectError::EmptyCatalog);
        }

        let estimate = estimate_proficiency(history, options);
        let target = target_tier(estimate.score, &options.tier_thresholds);
        debug!(
            "estimate {:.3} over {} attempts -> target tier {}",
            estimate.score,
            history.len(),
            target
        );

        // History arrives ordered oldest first, so the position of the last
        // occurrence of a question id is its recency key.
        let mut last_seen: HashMap<&str, usize> = HashMap::new();
        for (i, record) in history.iter().enumerate() {
            last_seen.insert(record.question_id.as_str(), i);
        }

        let present = present_tiers(catalog);

        if present.contains(&target) {
            // Target tier exists in the catalog: stay in it, preferring
            // unseen questions and falling back to the least recently
            // attempted one on exhaustion.
            return pick_in_tier(catalog, target, &last_seen).ok_or(SelectError::EmptyCatalog);
        }

        // Target tier has no catalog entries: widen outward to the nearest
        // tier that still has unseen questions, ties toward the lower tier.
        let order = widening_order(target, &present);
        for &tier in &order {
            if has_unattempted(catalog, tier, &last_seen) {
                debug!("target tier {target} absent, widening to tier {tier}");
                return pick_in_tier(catalog, tier, &last_seen).ok_or(SelectError::EmptyCatalog);
            }
        }

        // Everything has been attempted: nearest tier, least recently seen.
        let tier = order[0];
        debug!("target tier {target} absent and all tiers exhausted, reusing tier {tier}");
        pick_in_tier(catalog, tier, &last_seen).ok_or(SelectError::EmptyCatalog)
    }
}

/// Uniform random selection over unseen questions, falling back to the
/// whole catalog once every question has been attempted.
pub struct RandomSelector;

impl QuestionSelector for RandomSelector {
    fn select<'a>(
        &self,
        history: &[AttemptRecord],
        catalog: &'a [Question],
        _options: &SelectorOptions,
    ) -> Result<&'a Question, SelectError> {
        if catalog.is_empty() {
            return Err(SelectError::EmptyCatalog);
        }

        let attempted: HashSet<&str> = history.iter().map(|r| r.question_id.as_str()).collect();
        let unattempted: Vec<&Question> = catalog
            .iter()
            .filter(|q| !attempted.contains(q.id.as_str()))
            .collect();

        let pool: Vec<&Question> = if unattempted.is_empty() {
            catalog.iter().collect()
        } else {
            unattempted
        };

        let rng = &mut rand::thread_rng();
        pool.choose(rng).copied().ok_or(SelectError::EmptyCatalog)
    }
}

/// Pick from adaptive mode: the UI layer calls this once per displayed
/// question.
pub fn select_next_question<'a>(
    history: &[AttemptRecord],
    catalog: &'a [Question],
    options: &SelectorOptions,
) -> Result<&'a Question, SelectError> {
    AdaptiveSelector.select(history, catalog, options)
}

/// Pick in non-adaptive mode: uniform over questions not yet attempted.
pub fn select_random_question<'a>(
    history: &[AttemptRecord],
    catalog: &'a [Question],
) -> Result<&'a Question, SelectError> {
    RandomSelector.select(history, catalog, &SelectorOptions::default())
}

fn present_tiers(catalog: &[Question]) -> Vec<u8> {
    let mut tiers: Vec<u8> = catalog
        .iter()
        .map(|q| q.tier)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    tiers.sort_unstable();
    tiers
}

fn has_unattempted(catalog: &[Question], tier: u8, last_seen: &HashMap<&str, usize>) -> bool {
    catalog
        .iter()
        .any(|q| q.tier == tier && !last_seen.contains_key(q.id.as_str()))
}

/// Best candidate within a tier: unseen questions first (None sorts before
/// Some), then least recently attempted, ties broken by question id so the
/// result is stable across calls.
fn pick_in_tier<'a>(
    catalog: &'a [Question],
    tier: u8,
    last_seen: &HashMap<&str, usize>,
) -> Option<&'a Question> {
    catalog
        .iter()
        .filter(|q| q.tier == tier)
        .min_by_key(|q| (last_seen.get(q.id.as_str()).copied(), q.id.clone()))
}
