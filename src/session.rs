use crate::attempt::{AttemptRecord, Outcome};
use crate::catalog::{PracticeSet, Question};
use crate::history::{HistoryReader, ProgressDb};
use crate::selection::{estimate_proficiency, SelectError, SelectionMode, SelectorOptions};
use crate::util::{mean, std_dev};
use chrono::Local;
use itertools::Itertools;
use log::info;
use std::collections::HashSet;

/// Results of one practice sitting.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResults {
    pub answered: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub avg_time_secs: f64,
    pub std_dev: f64,
    pub estimate_before: f64,
    pub estimate_after: f64,
    /// (tier, correct, attempts) for this sitting, lowest tier first.
    pub per_tier: Vec<(u8, usize, usize)>,
}

/// represents one practice sitting over a loaded set
///
/// Serves questions through the configured selection strategy, grades
/// answers, and appends attempt records to the history snapshot (and the
/// progress store when one is attached). A question is never served twice
/// within the same sitting; the sitting ends when the set (or the optional
/// question limit) is used up.
#[derive(Debug)]
pub struct Session {
    pub username: String,
    pub set: PracticeSet,
    pub mode: SelectionMode,
    pub options: SelectorOptions,
    pub max_questions: Option<usize>,
    history: Vec<AttemptRecord>,
    session_attempts: Vec<AttemptRecord>,
    served: HashSet<String>,
    current: Option<String>,
    db: Option<ProgressDb>,
    estimate_before: f64,
}

impl Session {
    /// Session with no prior history and no persistence.
    pub fn new(
        username: &str,
        set: PracticeSet,
        mode: SelectionMode,
        options: SelectorOptions,
    ) -> Self {
        Self::with_history(username, set, mode, options, Vec::new(), None)
    }

    /// Session backed by a progress store; prior attempts are loaded from
    /// it and new attempts are appended to it.
    pub fn with_store(
        username: &str,
        set: PracticeSet,
        mode: SelectionMode,
        options: SelectorOptions,
        db: ProgressDb,
    ) -> rusqlite::Result<Self> {
        let history = db.get_attempts(username, &set.name)?;
        Ok(Self::with_history(
            username,
            set,
            mode,
            options,
            history,
            Some(db),
        ))
    }

    pub fn with_history(
        username: &str,
        set: PracticeSet,
        mode: SelectionMode,
        options: SelectorOptions,
        history: Vec<AttemptRecord>,
        db: Option<ProgressDb>,
    ) -> Self {
        let estimate_before = estimate_proficiency(&history, &options).score;
        info!(
            "starting {} practice for `{username}` on `{}` ({} questions, {} prior attempts)",
            mode,
            set.name,
            set.len(),
            history.len()
        );
        Self {
            username: username.to_string(),
            set,
            mode,
            options,
            max_questions: None,
            history,
            session_attempts: Vec::new(),
            served: HashSet::new(),
            current: None,
            db,
            estimate_before,
        }
    }

    pub fn with_max_questions(mut self, limit: Option<usize>) -> Self {
        self.max_questions = limit;
        self
    }

    /// Serve the next question, or `None` once the sitting is complete.
    ///
    /// Questions already served this sitting are excluded, so a sitting
    /// walks the whole set without repeats even when the persisted history
    /// has exhausted every tier.
    pub fn next_question(&mut self) -> Result<Option<&Question>, SelectError> {
        if let Some(limit) = self.max_questions {
            if self.served.len() >= limit {
                return Ok(None);
            }
        }

        let remaining: Vec<Question> = self
            .set
            .questions
            .iter()
            .filter(|q| !self.served.contains(&q.id))
            .cloned()
            .collect();
        if remaining.is_empty() {
            return Ok(None);
        }

        let picked = self
            .mode
            .selector()
            .select(&self.history, &remaining, &self.options)?
            .id
            .clone();
        self.served.insert(picked.clone());
        self.current = Some(picked.clone());

        Ok(self.set.question(&picked))
    }

    /// Grade the current question and record the attempt.
    ///
    /// Returns `None` when no question is outstanding.
    pub fn answer(&mut self, choice: &str, time_taken_secs: u32) -> Option<Outcome> {
        let id = self.current.take()?;
        let question = self.set.question(&id)?;

        let correct = question.is_correct(choice);
        let record = AttemptRecord {
            question_id: id,
            tier: question.tier,
            correct,
            time_taken_secs,
            attempted_at: Local::now(),
        };

        if let Some(ref db) = self.db {
            let _ = db.record_attempt(&self.username, &self.set.name, &record);
        }
        self.session_attempts.push(record.clone());
        self.history.push(record);

        if correct {
            Some(Outcome::Correct)
        } else {
            Some(Outcome::Incorrect)
        }
    }

    /// Number of questions answered this sitting.
    pub fn answered(&self) -> usize {
        self.session_attempts.len()
    }

    pub fn results(&self) -> SessionResults {
        let answered = self.session_attempts.len();
        let correct = self.session_attempts.iter().filter(|a| a.correct).count();
        let accuracy = if answered > 0 {
            ((correct as f64 / answered as f64) * 100.0).round()
        } else {
            0.0
        };

        let times: Vec<f64> = self
            .session_attempts
            .iter()
            .map(|a| a.time_taken_secs as f64)
            .collect();

        let per_tier = self
            .session_attempts
            .iter()
            .map(|a| (a.tier, a.correct))
            .into_group_map()
            .into_iter()
            .map(|(tier, outcomes)| {
                let total = outcomes.len();
                let hits = outcomes.into_iter().filter(|c| *c).count();
                (tier, hits, total)
            })
            .sorted()
            .collect();

        SessionResults {
            answered,
            correct,
            accuracy,
            avg_time_secs: mean(&times).unwrap_or(0.0),
            std_dev: std_dev(&times).unwrap_or(0.0),
            estimate_before: self.estimate_before,
            estimate_after: estimate_proficiency(&self.history, &self.options).score,
            per_tier,
        }
    }

    /// Hand the progress store back, e.g. to print a report after the
    /// sitting.
    pub fn into_store(self) -> Option<ProgressDb> {
        self.db
    }
}
