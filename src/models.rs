use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CommandError, ContestError};

pub type ContestTime = u32;

pub const DEFAULT_PENALTY_PER_WRONG_ATTEMPT: u64 = 20;
/// Problems are lettered `A..=Z`.
pub const MAX_PROBLEMS: usize = 26;

/// Letters of the first `count` problems, in order.
pub fn problem_letters(count: usize) -> impl Iterator<Item = char> {
    (b'A'..=b'Z').take(count).map(char::from)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionStatus {
    Accepted,
    WrongAnswer,
    RuntimeError,
    TimeLimitExceed,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Accepted => "Accepted",
            SubmissionStatus::WrongAnswer => "Wrong_Answer",
            SubmissionStatus::RuntimeError => "Runtime_Error",
            SubmissionStatus::TimeLimitExceed => "Time_Limit_Exceed",
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionStatus::Accepted)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Accepted" => Ok(SubmissionStatus::Accepted),
            "Wrong_Answer" => Ok(SubmissionStatus::WrongAnswer),
            "Runtime_Error" => Ok(SubmissionStatus::RuntimeError),
            "Time_Limit_Exceed" => Ok(SubmissionStatus::TimeLimitExceed),
            other => Err(CommandError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub problem: char,
    pub status: SubmissionStatus,
    pub time: ContestTime,
    /// Arrival order across the whole contest.
    pub seq: u64,
}

/// One team's standing on one problem.
#[derive(Debug, Clone, Default)]
pub struct ProblemStatus {
    pub solved: bool,
    /// Only meaningful when `solved`.
    pub solve_time: ContestTime,
    /// Failed attempts whose verdict is visible on the board.
    pub wrong_attempts: u32,
    settled: Vec<Submission>,
    frozen: Vec<Submission>,
}

impl ProblemStatus {
    pub fn frozen_count(&self) -> usize {
        self.frozen.len()
    }

    pub fn is_pending(&self) -> bool {
        !self.frozen.is_empty()
    }

    pub fn settled_submissions(&self) -> &[Submission] {
        &self.settled
    }

    pub fn frozen_submissions(&self) -> &[Submission] {
        &self.frozen
    }

    pub fn penalty(&self, per_wrong_attempt: u64) -> u64 {
        if !self.solved {
            return 0;
        }
        per_wrong_attempt
            .saturating_mul(u64::from(self.wrong_attempts))
            .saturating_add(u64::from(self.solve_time))
    }

    /// Returns whether the visible outcome changed.
    fn record(&mut self, submission: Submission, frozen: bool) -> bool {
        if self.solved {
            self.settled.push(submission);
            return false;
        }

        if frozen {
            self.frozen.push(submission);
            return false;
        }

        if submission.status.is_accepted() {
            self.solved = true;
            self.solve_time = submission.time;
        } else {
            self.wrong_attempts += 1;
        }
        self.settled.push(submission);
        true
    }

    /// Replays the withheld submissions. Returns whether the problem became solved.
    fn resolve_frozen(&mut self) -> bool {
        let pending = std::mem::take(&mut self.frozen);
        let mut solved_now = false;
        for submission in pending {
            if !self.solved {
                if submission.status.is_accepted() {
                    self.solved = true;
                    self.solve_time = submission.time;
                    solved_now = true;
                } else {
                    self.wrong_attempts += 1;
                }
            }
            self.settled.push(submission);
        }
        solved_now
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamMetrics {
    pub solved_count: u32,
    pub penalty: u64,
    /// Solve times of solved problems, latest first.
    pub solve_times_desc: Vec<ContestTime>,
}

/// Names are unique within a contest; equality and ordering both take the
/// metrics into account, so two snapshots of one team compare by standing.
#[derive(Debug, Clone)]
pub struct Team {
    pub name: String,
    penalty_per_wrong_attempt: u64,
    problems: BTreeMap<char, ProblemStatus>,
    metrics: TeamMetrics,
}

impl Team {
    pub fn new(name: String, penalty_per_wrong_attempt: u64) -> Self {
        Self {
            name,
            penalty_per_wrong_attempt,
            problems: BTreeMap::new(),
            metrics: TeamMetrics::default(),
        }
    }

    /// Materialises an empty status for each contest problem.
    pub fn open_problems(&mut self, count: usize) {
        for letter in problem_letters(count) {
            self.problems.entry(letter).or_default();
        }
        self.refresh_metrics();
    }

    pub fn metrics(&self) -> &TeamMetrics {
        &self.metrics
    }

    pub fn solved_count(&self) -> u32 {
        self.metrics.solved_count
    }

    pub fn penalty(&self) -> u64 {
        self.metrics.penalty
    }

    pub fn problem(&self, letter: char) -> Option<&ProblemStatus> {
        self.problems.get(&letter)
    }

    /// Problem statuses in letter order.
    pub fn problems(&self) -> impl Iterator<Item = (char, &ProblemStatus)> {
        self.problems.iter().map(|(letter, status)| (*letter, status))
    }

    pub fn record_submission(
        &mut self,
        submission: Submission,
        frozen: bool,
    ) -> Result<(), ContestError> {
        let status = self
            .problems
            .get_mut(&submission.problem)
            .ok_or(ContestError::UnknownProblem(submission.problem))?;

        if status.record(submission, frozen) {
            self.refresh_metrics();
        }
        Ok(())
    }

    pub fn has_pending_freeze(&self) -> bool {
        self.problems.values().any(ProblemStatus::is_pending)
    }

    /// Smallest letter that still has withheld submissions.
    pub fn next_pending_problem(&self) -> Option<char> {
        self.problems
            .iter()
            .find(|(_, status)| status.is_pending())
            .map(|(letter, _)| *letter)
    }

    /// Reveals the withheld verdicts of one problem. Returns `None` when nothing was
    /// pending, otherwise whether the problem became solved.
    pub fn resolve_problem(&mut self, letter: char) -> Option<bool> {
        let status = self.problems.get_mut(&letter)?;
        if !status.is_pending() {
            return None;
        }

        let solved_now = status.resolve_frozen();
        if solved_now {
            self.refresh_metrics();
        }
        Some(solved_now)
    }

    /// Latest settled submission matching both filters. Equal times resolve to the
    /// one recorded last.
    pub fn latest_submission(
        &self,
        problem: Option<char>,
        status: Option<SubmissionStatus>,
    ) -> Option<&Submission> {
        self.problems
            .values()
            .flat_map(|problem_status| problem_status.settled_submissions())
            .filter(|submission| problem.is_none_or(|p| submission.problem == p))
            .filter(|submission| status.is_none_or(|s| submission.status == s))
            .max_by_key(|submission| (submission.time, submission.seq))
    }

    fn refresh_metrics(&mut self) {
        let mut metrics = TeamMetrics::default();
        for status in self.problems.values().filter(|status| status.solved) {
            metrics.solved_count += 1;
            metrics.penalty = metrics
                .penalty
                .saturating_add(status.penalty(self.penalty_per_wrong_attempt));
            metrics.solve_times_desc.push(status.solve_time);
        }
        metrics.solve_times_desc.sort_unstable_by(|a, b| b.cmp(a));
        self.metrics = metrics;
    }
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Team {}

impl PartialOrd for Team {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `Less` means `self` ranks above `other`.
impl Ord for Team {
    fn cmp(&self, other: &Self) -> Ordering {
        let (mine, theirs) = (&self.metrics, &other.metrics);
        // More solved problems first
        theirs
            .solved_count
            .cmp(&mine.solved_count)
            // Then less penalty
            .then_with(|| mine.penalty.cmp(&theirs.penalty))
            // Then the earlier latest solve, position by position
            .then_with(|| compare_solve_times(&mine.solve_times_desc, &theirs.solve_times_desc))
            .then_with(|| self.name.cmp(&other.name))
    }
}

fn compare_solve_times(lhs: &[ContestTime], rhs: &[ContestTime]) -> Ordering {
    lhs.iter()
        .zip(rhs)
        .map(|(l, r)| l.cmp(r))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FreezePhase {
    #[default]
    Unfrozen,
    Frozen,
}

#[derive(Debug, Clone, Default)]
pub struct ContestState {
    pub started: bool,
    pub phase: FreezePhase,
    pub problem_count: usize,
    pub duration: ContestTime,
}

impl ContestState {
    pub fn is_frozen(&self) -> bool {
        self.phase == FreezePhase::Frozen
    }
}

/// Board row handed to the output adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    pub rank: usize,
    pub team: String,
    pub solved: u32,
    pub penalty: u64,
    pub problems: Vec<ProblemCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemCell {
    pub problem: char,
    pub solved: bool,
    pub solve_time: Option<ContestTime>,
    pub wrong_attempts: u32,
    pub frozen_attempts: usize,
    /// Withheld verdicts are still hidden behind the freeze.
    pub frozen: bool,
}

/// A team moved up during a scroll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankChange {
    pub team: String,
    /// The team now directly below `team`.
    pub displaced: String,
    pub solved: u32,
    pub penalty: u64,
}
