use crate::attempt::AttemptRecord;
use crate::history::{HistoryReader, ProgressDb, TierPerformance};
use crate::selection::{estimate_proficiency, target_tier, SelectorOptions};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::io::Write;
use time_humanize::HumanTime;

/// Aggregated progress for one user and practice set.
#[derive(Debug, Clone)]
pub struct ProgressReport {
    pub username: String,
    pub set_name: String,
    pub total_attempts: usize,
    pub total_correct: usize,
    pub estimate: f64,
    pub target_tier: u8,
    pub tiers: Vec<TierPerformance>,
    pub last_attempt: Option<DateTime<Local>>,
}

impl ProgressReport {
    pub fn from_db(
        db: &ProgressDb,
        username: &str,
        set_name: &str,
        options: &SelectorOptions,
    ) -> rusqlite::Result<Self> {
        let attempts = db.get_attempts(username, set_name)?;
        let tiers = db.tier_summary(username, set_name)?;
        let last_attempt = db.last_attempt_at(username, set_name)?;

        let estimate = estimate_proficiency(&attempts, options).score;
        Ok(Self {
            username: username.to_string(),
            set_name: set_name.to_string(),
            total_attempts: attempts.len(),
            total_correct: attempts.iter().filter(|a| a.correct).count(),
            estimate,
            target_tier: target_tier(estimate, &options.tier_thresholds),
            tiers,
            last_attempt,
        })
    }

    /// Percentage of correct attempts across all tiers (0-100).
    pub fn overall_accuracy(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            (self.total_correct as f64 / self.total_attempts as f64) * 100.0
        }
    }

    /// Plain-text rendering for the terminal.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "progress for {} on `{}`",
            self.username, self.set_name
        );

        if self.total_attempts == 0 {
            let _ = writeln!(out, "  no attempts recorded yet");
            return out;
        }

        let _ = writeln!(
            out,
            "  attempts: {}  accuracy: {:.0}%  estimate: {:.2} (target tier {})",
            self.total_attempts,
            self.overall_accuracy(),
            self.estimate,
            self.target_tier
        );
        if let Some(last) = self.last_attempt {
            let elapsed = Local::now().signed_duration_since(last).num_seconds();
            let _ = writeln!(
                out,
                "  last practiced {}",
                HumanTime::from(-elapsed)
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "  tier  attempts  correct  accuracy  avg time");
        for t in &self.tiers {
            let _ = writeln!(
                out,
                "  {:>4}  {:>8}  {:>7}  {:>7.0}%  {:>7.1}s",
                t.tier,
                t.attempts,
                t.correct,
                t.accuracy(),
                t.avg_time_secs
            );
        }

        out
    }
}

/// Export the full attempt log as CSV, most recent last.
pub fn export_csv<W: Write>(attempts: &[AttemptRecord], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["question_id", "tier", "correct", "time_taken_secs", "attempted_at"])?;

    for attempt in attempts {
        wtr.write_record(&[
            attempt.question_id.clone(),
            attempt.tier.to_string(),
            attempt.correct.to_string(),
            attempt.time_taken_secs.to_string(),
            attempt.attempted_at.to_rfc3339(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
