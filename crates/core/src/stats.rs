//! Pure aggregation over attempt and catalog snapshots.
//!
//! Everything here is recomputed from the snapshots on every call; results
//! are deterministic, including the tie order of category counts.

use std::collections::HashMap;

use crate::model::{Attempt, AttemptStatus, Difficulty, Problem, ProblemId};

//
// ─── STATISTICS TYPES ──────────────────────────────────────────────────────────
//

/// Attempt counts per status, plus the grand total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTotals {
    pub total: u32,
    pub completed: u32,
    pub attempted: u32,
    pub skipped: u32,
}

impl StatusTotals {
    fn bump(&mut self, status: AttemptStatus) {
        self.total += 1;
        match status {
            AttemptStatus::Completed => self.completed += 1,
            AttemptStatus::Attempted => self.attempted += 1,
            AttemptStatus::Skipped => self.skipped += 1,
        }
    }
}

/// Attempt counts per problem difficulty; every bucket is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DifficultyTotals {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyTotals {
    fn bump(&mut self, difficulty: Difficulty) {
        match difficulty {
            Difficulty::Easy => self.easy += 1,
            Difficulty::Medium => self.medium += 1,
            Difficulty::Hard => self.hard += 1,
        }
    }

    #[must_use]
    pub fn get(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

/// One entry of the category frequency table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: u32,
}

/// Derived statistics over one user's attempts joined against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub statuses: StatusTotals,
    pub difficulties: DifficultyTotals,
    /// Category frequency table in first-encountered order.
    pub categories: Vec<CategoryCount>,
    /// `completed / total` as a rounded integer percentage; 0 when empty.
    pub completion_rate: u8,
}

impl Statistics {
    /// The frequency table sorted by count descending, ties broken by
    /// first-encountered order, truncated to `n` entries.
    #[must_use]
    pub fn top_categories(&self, n: usize) -> Vec<CategoryCount> {
        let mut sorted = self.categories.clone();
        // stable sort keeps insertion order for equal counts
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted.truncate(n);
        sorted
    }
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

/// Reduce attempt and catalog snapshots into `Statistics`.
///
/// Every attempt counts toward its status bucket and the total. Difficulty
/// and category attribution require the referenced problem to be present in
/// the catalog snapshot; an attempt whose problem has since been removed is
/// skipped for those two tables.
#[must_use]
pub fn aggregate(attempts: &[Attempt], problems: &[Problem]) -> Statistics {
    let by_id: HashMap<ProblemId, &Problem> = problems.iter().map(|p| (p.id(), p)).collect();

    let mut statuses = StatusTotals::default();
    let mut difficulties = DifficultyTotals::default();
    let mut categories: Vec<CategoryCount> = Vec::new();
    let mut category_index: HashMap<String, usize> = HashMap::new();

    for attempt in attempts {
        statuses.bump(attempt.status);

        let Some(problem) = by_id.get(&attempt.problem_id) else {
            continue;
        };

        difficulties.bump(problem.difficulty());

        match category_index.get(problem.category()) {
            Some(&slot) => categories[slot].count += 1,
            None => {
                category_index.insert(problem.category().to_owned(), categories.len());
                categories.push(CategoryCount {
                    category: problem.category().to_owned(),
                    count: 1,
                });
            }
        }
    }

    Statistics {
        statuses,
        difficulties,
        categories,
        completion_rate: completion_rate(statuses.completed, statuses.total),
    }
}

fn completion_rate(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = f64::from(completed) / f64::from(total) * 100.0;
    // ratio is within 0..=100, so the cast cannot truncate
    ratio.round() as u8
}

//
// ─── TRACKED VIEW ──────────────────────────────────────────────────────────────
//

/// An attempt paired with its catalog problem, if the catalog still has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedProblem {
    pub attempt: Attempt,
    pub problem: Option<Problem>,
}

/// Join attempts against the catalog for the progress list view.
///
/// Attempt order is preserved; a missing problem leaves the slot empty rather
/// than dropping the record.
#[must_use]
pub fn tracked(attempts: &[Attempt], problems: &[Problem]) -> Vec<TrackedProblem> {
    let by_id: HashMap<ProblemId, &Problem> = problems.iter().map(|p| (p.id(), p)).collect();

    attempts
        .iter()
        .map(|attempt| TrackedProblem {
            attempt: attempt.clone(),
            problem: by_id.get(&attempt.problem_id).map(|p| (*p).clone()),
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProblemDraft, UserId};
    use crate::time::fixed_today;

    fn problem(id: u64, name: &str, difficulty: Difficulty, category: &str) -> Problem {
        ProblemDraft {
            name: name.to_string(),
            link: format!("https://leetcode.com/problems/{id}"),
            difficulty,
            category: category.to_string(),
        }
        .validate()
        .unwrap()
        .assign_id(ProblemId::new(id))
    }

    fn attempt(problem_id: u64, status: AttemptStatus) -> Attempt {
        Attempt {
            user_id: UserId::new(1),
            problem_id: ProblemId::new(problem_id),
            status,
            num_attempts: 1,
            notes: String::new(),
            date_attempted: fixed_today(),
        }
    }

    #[test]
    fn empty_inputs_yield_zeroes() {
        let stats = aggregate(&[], &[]);
        assert_eq!(stats.statuses, StatusTotals::default());
        assert_eq!(stats.difficulties, DifficultyTotals::default());
        assert!(stats.categories.is_empty());
        assert_eq!(stats.completion_rate, 0);
    }

    #[test]
    fn all_completed_yields_full_rate() {
        let problems = vec![
            problem(1, "Two Sum", Difficulty::Easy, "Arrays"),
            problem(2, "Word Ladder", Difficulty::Hard, "Graphs"),
        ];
        let attempts = vec![
            attempt(1, AttemptStatus::Completed),
            attempt(2, AttemptStatus::Completed),
        ];

        let stats = aggregate(&attempts, &problems);
        assert_eq!(stats.statuses.completed, stats.statuses.total);
        assert_eq!(stats.completion_rate, 100);
    }

    #[test]
    fn statuses_and_difficulties_are_bucketed() {
        let problems = vec![
            problem(1, "Two Sum", Difficulty::Easy, "Arrays"),
            problem(2, "Course Schedule", Difficulty::Medium, "Graphs"),
            problem(3, "Word Ladder", Difficulty::Hard, "Graphs"),
        ];
        let attempts = vec![
            attempt(1, AttemptStatus::Completed),
            attempt(2, AttemptStatus::Attempted),
            attempt(3, AttemptStatus::Skipped),
        ];

        let stats = aggregate(&attempts, &problems);
        assert_eq!(stats.statuses.total, 3);
        assert_eq!(stats.statuses.completed, 1);
        assert_eq!(stats.statuses.attempted, 1);
        assert_eq!(stats.statuses.skipped, 1);
        assert_eq!(stats.difficulties.get(Difficulty::Easy), 1);
        assert_eq!(stats.difficulties.get(Difficulty::Medium), 1);
        assert_eq!(stats.difficulties.get(Difficulty::Hard), 1);
        // 1 of 3 completed, rounded
        assert_eq!(stats.completion_rate, 33);
    }

    #[test]
    fn orphaned_attempt_counts_toward_status_only() {
        let problems = vec![problem(1, "Two Sum", Difficulty::Easy, "Arrays")];
        let attempts = vec![
            attempt(1, AttemptStatus::Completed),
            // problem 99 was removed from the catalog
            attempt(99, AttemptStatus::Attempted),
        ];

        let stats = aggregate(&attempts, &problems);
        assert_eq!(stats.statuses.total, 2);
        assert_eq!(stats.statuses.attempted, 1);
        assert_eq!(stats.difficulties.get(Difficulty::Easy), 1);
        assert_eq!(
            stats.difficulties.easy + stats.difficulties.medium + stats.difficulties.hard,
            1
        );
        assert_eq!(stats.categories.len(), 1);
        assert_eq!(stats.completion_rate, 50);
    }

    #[test]
    fn categories_keep_first_encountered_order() {
        let problems = vec![
            problem(1, "Course Schedule", Difficulty::Medium, "Graphs"),
            problem(2, "Two Sum", Difficulty::Easy, "Arrays"),
            problem(3, "Word Ladder", Difficulty::Hard, "Graphs"),
        ];
        let attempts = vec![
            attempt(1, AttemptStatus::Completed),
            attempt(2, AttemptStatus::Completed),
            attempt(3, AttemptStatus::Completed),
        ];

        let stats = aggregate(&attempts, &problems);
        let names: Vec<&str> = stats.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Graphs", "Arrays"]);
        assert_eq!(stats.categories[0].count, 2);
    }

    #[test]
    fn top_categories_sorts_descending_with_stable_ties() {
        let problems = vec![
            problem(1, "Valid Anagram", Difficulty::Easy, "Strings"),
            problem(2, "Two Sum", Difficulty::Easy, "Arrays"),
            problem(3, "Course Schedule", Difficulty::Medium, "Graphs"),
            problem(4, "Word Ladder", Difficulty::Hard, "Graphs"),
        ];
        let attempts = vec![
            attempt(1, AttemptStatus::Completed),
            attempt(2, AttemptStatus::Completed),
            attempt(3, AttemptStatus::Completed),
            attempt(4, AttemptStatus::Completed),
        ];

        let stats = aggregate(&attempts, &problems);
        let top = stats.top_categories(5);
        assert_eq!(top[0].category, "Graphs");
        assert_eq!(top[0].count, 2);
        // Strings and Arrays tie at 1; first-encountered wins
        assert_eq!(top[1].category, "Strings");
        assert_eq!(top[2].category, "Arrays");
    }

    #[test]
    fn top_categories_truncates() {
        let problems: Vec<Problem> = (1..=7)
            .map(|id| {
                problem(
                    id,
                    &format!("Problem {id}"),
                    Difficulty::Easy,
                    &format!("Category {id}"),
                )
            })
            .collect();
        let attempts: Vec<Attempt> = (1..=7)
            .map(|id| attempt(id, AttemptStatus::Completed))
            .collect();

        let stats = aggregate(&attempts, &problems);
        assert_eq!(stats.categories.len(), 7);
        assert_eq!(stats.top_categories(5).len(), 5);
    }

    #[test]
    fn aggregate_is_deterministic() {
        let problems = vec![
            problem(1, "Two Sum", Difficulty::Easy, "Arrays"),
            problem(2, "Course Schedule", Difficulty::Medium, "Graphs"),
        ];
        let attempts = vec![
            attempt(1, AttemptStatus::Completed),
            attempt(2, AttemptStatus::Skipped),
        ];

        let first = aggregate(&attempts, &problems);
        let second = aggregate(&attempts, &problems);
        assert_eq!(first, second);
        assert_eq!(first.top_categories(5), second.top_categories(5));
    }

    #[test]
    fn completion_rate_rounds_to_nearest() {
        let problems = vec![problem(1, "Two Sum", Difficulty::Easy, "Arrays")];
        let attempts = vec![
            attempt(1, AttemptStatus::Completed),
            attempt(99, AttemptStatus::Attempted),
            attempt(98, AttemptStatus::Attempted),
        ];
        // 1/3 = 33.33 -> 33
        assert_eq!(aggregate(&attempts, &problems).completion_rate, 33);

        let attempts = vec![
            attempt(1, AttemptStatus::Completed),
            attempt(99, AttemptStatus::Completed),
            attempt(98, AttemptStatus::Attempted),
        ];
        // 2/3 = 66.67 -> 67
        assert_eq!(aggregate(&attempts, &problems).completion_rate, 67);
    }

    #[test]
    fn tracked_pairs_attempts_with_problems_in_order() {
        let problems = vec![problem(1, "Two Sum", Difficulty::Easy, "Arrays")];
        let attempts = vec![
            attempt(99, AttemptStatus::Attempted),
            attempt(1, AttemptStatus::Completed),
        ];

        let view = tracked(&attempts, &problems);
        assert_eq!(view.len(), 2);
        assert!(view[0].problem.is_none());
        assert_eq!(
            view[1].problem.as_ref().map(Problem::name),
            Some("Two Sum")
        );
        assert_eq!(view[1].attempt.status, AttemptStatus::Completed);
    }
}
