use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::model::ids::ProblemId;

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty tier of a catalog problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All tiers in ascending order, used to seed aggregate buckets.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty: {0:?}")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            other => Err(ParseDifficultyError(other.to_string())),
        }
    }
}

//
// ─── VALIDATION ERRORS ─────────────────────────────────────────────────────────
//

/// A single field rejected while validating a problem draft.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProblemDraftIssue {
    #[error("problem name must be at least 3 characters")]
    NameTooShort,

    #[error("problem link must be an absolute URL")]
    InvalidLink,

    #[error("category must be at least 2 characters")]
    CategoryTooShort,
}

/// Draft validation failure carrying every rejected field, so a form can
/// surface all of them at once.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("problem draft failed validation on {} field(s)", .issues.len())]
pub struct ProblemValidationError {
    issues: Vec<ProblemDraftIssue>,
}

impl ProblemValidationError {
    #[must_use]
    pub fn issues(&self) -> &[ProblemDraftIssue] {
        &self.issues
    }

    #[must_use]
    pub fn contains(&self, issue: &ProblemDraftIssue) -> bool {
        self.issues.contains(issue)
    }
}

//
// ─── PROBLEM TYPES ─────────────────────────────────────────────────────────────
//

/// User-submitted fields for a new catalog problem, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemDraft {
    pub name: String,
    pub link: String,
    pub difficulty: Difficulty,
    pub category: String,
}

impl ProblemDraft {
    /// Validate the draft against the catalog invariants.
    ///
    /// Name and category are trimmed before the length checks. All failing
    /// fields are collected into one error.
    ///
    /// # Errors
    ///
    /// Returns `ProblemValidationError` listing every rejected field.
    pub fn validate(self) -> Result<ValidatedProblem, ProblemValidationError> {
        let mut issues = Vec::new();

        let name = self.name.trim().to_owned();
        if name.chars().count() < 3 {
            issues.push(ProblemDraftIssue::NameTooShort);
        }

        let link = match Url::parse(self.link.trim()) {
            Ok(url) => Some(url),
            Err(_) => {
                issues.push(ProblemDraftIssue::InvalidLink);
                None
            }
        };

        let category = self.category.trim().to_owned();
        if category.chars().count() < 2 {
            issues.push(ProblemDraftIssue::CategoryTooShort);
        }

        if !issues.is_empty() {
            return Err(ProblemValidationError { issues });
        }

        Ok(ValidatedProblem {
            name,
            // link is always Some when no issue was recorded for it
            link: link.ok_or(ProblemValidationError {
                issues: vec![ProblemDraftIssue::InvalidLink],
            })?,
            difficulty: self.difficulty,
            category,
        })
    }
}

/// A problem draft that passed validation and is ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProblem {
    pub name: String,
    pub link: Url,
    pub difficulty: Difficulty,
    pub category: String,
}

impl ValidatedProblem {
    /// Attach the server-assigned identity, producing a catalog `Problem`.
    #[must_use]
    pub fn assign_id(self, id: ProblemId) -> Problem {
        Problem {
            id,
            name: self.name,
            link: self.link,
            difficulty: self.difficulty,
            category: self.category,
        }
    }
}

/// A catalog problem with a server-assigned identity.
///
/// Identity is immutable once assigned; the client never destroys catalog
/// records (removal is server-authoritative and shows up via re-fetch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    id: ProblemId,
    name: String,
    link: Url,
    difficulty: Difficulty,
    category: String,
}

impl Problem {
    /// Rebuild a problem from a server record.
    ///
    /// Server data is authoritative, so no draft validation is re-applied;
    /// callers must already hold a parsed absolute URL.
    #[must_use]
    pub fn from_remote(
        id: ProblemId,
        name: impl Into<String>,
        link: Url,
        difficulty: Difficulty,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            link,
            difficulty,
            category: category.into(),
        }
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ProblemId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn link(&self) -> &Url {
        &self.link
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, link: &str, category: &str) -> ProblemDraft {
        ProblemDraft {
            name: name.to_string(),
            link: link.to_string(),
            difficulty: Difficulty::Easy,
            category: category.to_string(),
        }
    }

    #[test]
    fn valid_draft_validates_and_assigns_id() {
        let validated = draft("Two Sum", "https://leetcode.com/problems/two-sum", "Arrays")
            .validate()
            .unwrap();

        let problem = validated.assign_id(ProblemId::new(7));
        assert_eq!(problem.id(), ProblemId::new(7));
        assert_eq!(problem.name(), "Two Sum");
        assert_eq!(problem.difficulty(), Difficulty::Easy);
        assert_eq!(problem.category(), "Arrays");
        assert_eq!(
            problem.link().as_str(),
            "https://leetcode.com/problems/two-sum"
        );
    }

    #[test]
    fn draft_trims_name_and_category() {
        let validated = draft("  Two Sum  ", "https://leetcode.com/x", "  Arrays  ")
            .validate()
            .unwrap();
        assert_eq!(validated.name, "Two Sum");
        assert_eq!(validated.category, "Arrays");
    }

    #[test]
    fn draft_rejects_short_name() {
        let err = draft("ab", "https://leetcode.com/x", "Arrays")
            .validate()
            .unwrap_err();
        assert!(err.contains(&ProblemDraftIssue::NameTooShort));
    }

    #[test]
    fn draft_rejects_relative_link() {
        let err = draft("Two Sum", "/problems/two-sum", "Arrays")
            .validate()
            .unwrap_err();
        assert!(err.contains(&ProblemDraftIssue::InvalidLink));
    }

    #[test]
    fn draft_rejects_short_category() {
        let err = draft("Two Sum", "https://leetcode.com/x", "A")
            .validate()
            .unwrap_err();
        assert!(err.contains(&ProblemDraftIssue::CategoryTooShort));
    }

    #[test]
    fn draft_collects_every_failing_field() {
        let err = draft("", "nope", "").validate().unwrap_err();
        assert_eq!(err.issues().len(), 3);
        assert!(err.contains(&ProblemDraftIssue::NameTooShort));
        assert!(err.contains(&ProblemDraftIssue::InvalidLink));
        assert!(err.contains(&ProblemDraftIssue::CategoryTooShort));
    }

    #[test]
    fn difficulty_round_trips_through_strings() {
        for difficulty in Difficulty::ALL {
            let parsed: Difficulty = difficulty.as_str().parse().unwrap();
            assert_eq!(parsed, difficulty);
        }
        assert!("easy".parse::<Difficulty>().is_err());
        assert!("Expert".parse::<Difficulty>().is_err());
    }
}
