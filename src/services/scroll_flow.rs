use std::collections::BTreeMap;

use tracing::{debug, error, info};

use crate::models::{RankChange, Team};
use crate::services::scoreboard::Scoreboard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Only failures were withheld; the board does not move.
    Unsolved,
    /// Solved, but the team already beats nobody above it.
    SolvedInPlace,
    Promoted(RankChange),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealStep {
    pub team: String,
    pub problem: char,
    pub outcome: RevealOutcome,
}

/// Reveals the next withheld problem: lowest ranked pending team first, then its
/// smallest pending letter. Returns `None` once nothing is pending.
pub fn advance_scroll(teams: &mut BTreeMap<String, Team>, board: &mut Scoreboard) -> Option<RevealStep> {
    let index = find_last_pending_index(teams, board)?;
    let team_name = board.order()[index].clone();

    let Some(team) = teams.get_mut(&team_name) else {
        error!("Scoreboard lists unknown team {}", team_name);
        return None;
    };
    let problem = team.next_pending_problem()?;
    let solved = team.resolve_problem(problem)?;

    if !solved {
        debug!("Reveal {} {}: unsolved", team_name, problem);
        return Some(RevealStep {
            team: team_name,
            problem,
            outcome: RevealOutcome::Unsolved,
        });
    }

    let outcome = match board.promote(&team_name, teams) {
        Some((old_index, new_index)) => {
            let displaced = board.order()[new_index + 1].clone();
            let team = &teams[&team_name];
            debug!(
                "Reveal {} {}: solved, rank {} -> {}",
                team_name,
                problem,
                old_index + 1,
                new_index + 1
            );
            RevealOutcome::Promoted(RankChange {
                team: team_name.clone(),
                displaced,
                solved: team.solved_count(),
                penalty: team.penalty(),
            })
        }
        None => {
            debug!("Reveal {} {}: solved, rank unchanged", team_name, problem);
            RevealOutcome::SolvedInPlace
        }
    };

    Some(RevealStep {
        team: team_name,
        problem,
        outcome,
    })
}

/// Reveals every withheld problem, collecting the rank changes in reveal order.
pub fn run_scroll(teams: &mut BTreeMap<String, Team>, board: &mut Scoreboard) -> Vec<RankChange> {
    let mut changes = Vec::new();
    let mut reveals = 0usize;
    while let Some(step) = advance_scroll(teams, board) {
        reveals += 1;
        if let RevealOutcome::Promoted(change) = step.outcome {
            changes.push(change);
        }
    }
    info!(
        "Scroll revealed {} problems with {} rank changes",
        reveals,
        changes.len()
    );
    changes
}

fn find_last_pending_index(teams: &BTreeMap<String, Team>, board: &Scoreboard) -> Option<usize> {
    board
        .order()
        .iter()
        .rposition(|name| teams.get(name).is_some_and(Team::has_pending_freeze))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_PENALTY_PER_WRONG_ATTEMPT, Submission, SubmissionStatus};

    struct Fixture {
        teams: BTreeMap<String, Team>,
        board: Scoreboard,
        seq: u64,
    }

    impl Fixture {
        fn new(names: &[&str]) -> Self {
            let teams = names
                .iter()
                .map(|name| {
                    let mut team = Team::new(name.to_string(), DEFAULT_PENALTY_PER_WRONG_ATTEMPT);
                    team.open_problems(3);
                    (name.to_string(), team)
                })
                .collect();
            Self {
                teams,
                board: Scoreboard::new(),
                seq: 0,
            }
        }

        fn submit(&mut self, team: &str, problem: char, status: SubmissionStatus, time: u32, frozen: bool) {
            self.seq += 1;
            let submission = Submission {
                problem,
                status,
                time,
                seq: self.seq,
            };
            self.teams
                .get_mut(team)
                .unwrap()
                .record_submission(submission, frozen)
                .unwrap();
        }
    }

    #[test]
    fn test_nothing_pending_reveals_nothing() {
        let mut fx = Fixture::new(&["a", "b"]);
        fx.submit("a", 'A', SubmissionStatus::Accepted, 10, false);
        fx.board.flush(&fx.teams);
        let before = fx.board.order().to_vec();

        assert!(run_scroll(&mut fx.teams, &mut fx.board).is_empty());
        assert_eq!(fx.board.order(), before.as_slice());
    }

    #[test]
    fn test_lowest_ranked_team_and_smallest_letter_first() {
        let mut fx = Fixture::new(&["a", "b", "c"]);
        fx.submit("a", 'A', SubmissionStatus::Accepted, 5, false);
        fx.submit("b", 'A', SubmissionStatus::Accepted, 6, false);
        // c is last; b sits between
        fx.submit("b", 'C', SubmissionStatus::WrongAnswer, 100, true);
        fx.submit("c", 'C', SubmissionStatus::WrongAnswer, 101, true);
        fx.submit("c", 'B', SubmissionStatus::WrongAnswer, 102, true);
        fx.board.flush(&fx.teams);
        assert_eq!(fx.board.order(), ["a", "b", "c"]);

        let order: Vec<(String, char)> = std::iter::from_fn(|| advance_scroll(&mut fx.teams, &mut fx.board))
            .map(|step| {
                assert_eq!(step.outcome, RevealOutcome::Unsolved);
                (step.team, step.problem)
            })
            .collect();

        assert_eq!(
            order,
            vec![
                ("c".to_string(), 'B'),
                ("c".to_string(), 'C'),
                ("b".to_string(), 'C')
            ]
        );
        assert_eq!(fx.board.order(), ["a", "b", "c"]);
        assert_eq!(fx.teams["c"].problem('B').unwrap().wrong_attempts, 1);
    }

    #[test]
    fn test_promotion_emits_change_with_displaced_team() {
        let mut fx = Fixture::new(&["a", "b", "c"]);
        fx.submit("a", 'A', SubmissionStatus::Accepted, 50, false);
        fx.submit("c", 'A', SubmissionStatus::WrongAnswer, 100, true);
        fx.submit("c", 'A', SubmissionStatus::Accepted, 110, true);
        fx.submit("c", 'B', SubmissionStatus::Accepted, 120, true);
        fx.board.flush(&fx.teams);

        let changes = run_scroll(&mut fx.teams, &mut fx.board);

        assert_eq!(
            changes,
            vec![
                RankChange {
                    team: "c".to_string(),
                    displaced: "b".to_string(),
                    solved: 1,
                    penalty: 130,
                },
                RankChange {
                    team: "c".to_string(),
                    displaced: "a".to_string(),
                    solved: 2,
                    penalty: 250,
                },
            ]
        );
        assert_eq!(fx.board.order(), ["c", "a", "b"]);
    }

    #[test]
    fn test_solve_without_overtaking_moves_nothing() {
        let mut fx = Fixture::new(&["a", "b"]);
        fx.submit("a", 'A', SubmissionStatus::Accepted, 5, false);
        fx.submit("a", 'B', SubmissionStatus::Accepted, 6, false);
        fx.submit("b", 'A', SubmissionStatus::Accepted, 200, true);
        fx.board.flush(&fx.teams);

        let step = advance_scroll(&mut fx.teams, &mut fx.board).unwrap();
        assert_eq!(step.outcome, RevealOutcome::SolvedInPlace);
        assert_eq!(fx.teams["b"].solved_count(), 1);
        assert_eq!(fx.board.order(), ["a", "b"]);
        assert!(advance_scroll(&mut fx.teams, &mut fx.board).is_none());
    }

    #[test]
    fn test_promoted_team_keeps_revealing_from_new_position() {
        let mut fx = Fixture::new(&["a", "b", "c"]);
        fx.submit("a", 'A', SubmissionStatus::Accepted, 10, false);
        fx.submit("a", 'B', SubmissionStatus::WrongAnswer, 150, true);
        fx.submit("c", 'A', SubmissionStatus::Accepted, 100, true);
        fx.submit("c", 'B', SubmissionStatus::Accepted, 110, true);
        fx.board.flush(&fx.teams);
        assert_eq!(fx.board.order(), ["a", "b", "c"]);

        let steps: Vec<RevealStep> =
            std::iter::from_fn(|| advance_scroll(&mut fx.teams, &mut fx.board)).collect();
        let revealed: Vec<(&str, char)> = steps
            .iter()
            .map(|step| (step.team.as_str(), step.problem))
            .collect();

        // c climbs above b, then still is the lowest pending team
        assert_eq!(revealed, vec![("c", 'A'), ("c", 'B'), ("a", 'B')]);
        assert_eq!(fx.board.order(), ["c", "a", "b"]);
    }
}
