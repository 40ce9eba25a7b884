use chrono::{DateTime, Local};

#[derive(Clone, Debug, Copy, PartialEq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// One historical answer event, immutable once created.
///
/// `attempted_at` is used for recency ordering only; histories are kept
/// ordered oldest first, most recent last.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub question_id: String,
    pub tier: u8,
    pub correct: bool,
    pub time_taken_secs: u32,
    pub attempted_at: DateTime<Local>,
}

impl AttemptRecord {
    pub fn outcome(&self) -> Outcome {
        if self.correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_mapping() {
        let attempt = AttemptRecord {
            question_id: "q1".to_string(),
            tier: 2,
            correct: true,
            time_taken_secs: 30,
            attempted_at: Local::now(),
        };
        assert_eq!(attempt.outcome(), Outcome::Correct);

        let missed = AttemptRecord {
            correct: false,
            ..attempt
        };
        assert_eq!(missed.outcome(), Outcome::Incorrect);
    }
}
