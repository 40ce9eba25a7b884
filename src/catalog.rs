use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

static SETS_DIR: Dir = include_dir!("src/sets");

/// Option letters for multiple-choice questions, in display order.
pub const OPTION_LETTERS: [&str; 5] = ["A", "B", "C", "D", "E"];

/// One available question in a practice set.
///
/// The selection engine only looks at `id` and `tier`; the remaining fields
/// are presentation payload for the front end.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Question {
    pub id: String,
    pub tier: u8,
    pub prompt: String,
    #[serde(default)]
    pub choices: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl Question {
    /// Grade a choice letter against this question's answer.
    pub fn is_correct(&self, choice: &str) -> bool {
        self.answer.eq_ignore_ascii_case(choice.trim())
    }
}

/// A named, immutable collection of questions loaded once per session.
#[derive(Deserialize, Clone, Debug)]
pub struct PracticeSet {
    pub name: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no built-in practice set named `{0}`")]
    UnknownSet(String),
    #[error("failed to read practice set: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse practice set: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid practice set: {0}")]
    Invalid(String),
}

impl PracticeSet {
    /// Load a built-in practice set compiled into the binary.
    pub fn builtin(name: &str) -> Result<Self, CatalogError> {
        let file = SETS_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| CatalogError::UnknownSet(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| CatalogError::Invalid(format!("set `{name}` is not valid utf-8")))?;
        Self::from_json(contents)
    }

    /// Names of all built-in practice sets.
    pub fn builtin_names() -> Vec<String> {
        let mut names: Vec<String> = SETS_DIR
            .files()
            .filter_map(|f| {
                f.path()
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .collect();
        names.sort();
        names
    }

    /// Load a practice set from an external JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, CatalogError> {
        let set: PracticeSet = from_str(contents)?;
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for q in &self.questions {
            if q.tier == 0 {
                return Err(CatalogError::Invalid(format!(
                    "question `{}` has tier 0; tiers start at 1",
                    q.id
                )));
            }
            if q.choices.len() > OPTION_LETTERS.len() {
                return Err(CatalogError::Invalid(format!(
                    "question `{}` has more than {} choices",
                    q.id,
                    OPTION_LETTERS.len()
                )));
            }
            if q.answer.trim().is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "question `{}` has an empty answer",
                    q.id
                )));
            }
            if !seen.insert(q.id.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate question id `{}`",
                    q.id
                )));
            }
        }
        Ok(())
    }

    /// Sorted distinct difficulty tiers present in this set.
    pub fn tiers(&self) -> Vec<u8> {
        let mut tiers: Vec<u8> = self
            .questions
            .iter()
            .map(|q| q.tier)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        tiers.sort_unstable();
        tiers
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
