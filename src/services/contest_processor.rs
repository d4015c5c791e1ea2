use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::ContestError;
use crate::models::{
    ContestState, ContestTime, FreezePhase, MAX_PROBLEMS, ProblemCell, RankChange, StandingRow,
    Submission, SubmissionStatus, Team, problem_letters,
};
use crate::services::config_loader::ScoreboardConfig;
use crate::services::scoreboard::Scoreboard;
use crate::services::scroll_flow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollReport {
    /// Board as it stood under the freeze, after a flush.
    pub frozen_board: Vec<StandingRow>,
    pub changes: Vec<RankChange>,
    pub final_board: Vec<StandingRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingAnswer {
    pub rank: usize,
    /// Withheld verdicts may still move this team.
    pub provisional: bool,
}

/// The whole contest: teams, their board, and the freeze state machine.
#[derive(Debug)]
pub struct ContestSystem {
    config: ScoreboardConfig,
    state: ContestState,
    teams: BTreeMap<String, Team>,
    board: Scoreboard,
    next_seq: u64,
}

impl ContestSystem {
    pub fn new(config: ScoreboardConfig) -> Self {
        Self {
            config,
            state: ContestState::default(),
            teams: BTreeMap::new(),
            board: Scoreboard::new(),
            next_seq: 0,
        }
    }

    pub fn state(&self) -> &ContestState {
        &self.state
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    pub fn board(&self) -> &Scoreboard {
        &self.board
    }

    pub fn add_team(&mut self, name: &str) -> Result<(), ContestError> {
        if self.state.started {
            warn!("Rejecting team {}: contest already started", name);
            return Err(ContestError::AlreadyStarted);
        }
        if self.teams.contains_key(name) {
            warn!("Rejecting duplicated team {}", name);
            return Err(ContestError::DuplicateTeam(name.to_string()));
        }

        self.teams.insert(
            name.to_string(),
            Team::new(name.to_string(), self.config.penalty_per_wrong_attempt),
        );
        self.board.insert_by_name(name);
        info!("Added new team {}", name);
        Ok(())
    }

    pub fn start(&mut self, duration: ContestTime, problem_count: usize) -> Result<(), ContestError> {
        if self.state.started {
            warn!("Ignoring second start");
            return Err(ContestError::AlreadyStarted);
        }
        if !(1..=MAX_PROBLEMS).contains(&problem_count) {
            return Err(ContestError::InvalidProblemCount {
                count: problem_count,
                max: MAX_PROBLEMS,
            });
        }

        for team in self.teams.values_mut() {
            team.open_problems(problem_count);
        }
        self.state.started = true;
        self.state.duration = duration;
        self.state.problem_count = problem_count;
        info!(
            "Contest started: {} teams, {} problems, duration {}",
            self.teams.len(),
            problem_count,
            duration
        );
        Ok(())
    }

    pub fn submit(
        &mut self,
        problem: char,
        team_name: &str,
        status: SubmissionStatus,
        time: ContestTime,
    ) -> Result<(), ContestError> {
        if !self.state.started {
            return Err(ContestError::NotStarted);
        }
        if !problem_letters(self.state.problem_count).any(|letter| letter == problem) {
            return Err(ContestError::UnknownProblem(problem));
        }
        let frozen = self.state.is_frozen();
        let team = self
            .teams
            .get_mut(team_name)
            .ok_or_else(|| ContestError::UnknownTeam(team_name.to_string()))?;

        if time > self.state.duration {
            warn!(
                "Submission by {} at {} is past the contest duration {}",
                team_name, time, self.state.duration
            );
        }

        let submission = Submission {
            problem,
            status,
            time,
            seq: self.next_seq,
        };
        team.record_submission(submission, frozen)?;
        self.next_seq += 1;
        debug!(
            "Recorded {} {} {} at {}{}",
            team_name,
            problem,
            status,
            time,
            if frozen { " (frozen)" } else { "" }
        );
        Ok(())
    }

    pub fn flush(&mut self) {
        self.board.flush(&self.teams);
    }

    pub fn freeze(&mut self) -> Result<(), ContestError> {
        if self.state.is_frozen() {
            warn!("Freeze requested while already frozen");
            return Err(ContestError::AlreadyFrozen);
        }
        self.state.phase = FreezePhase::Frozen;
        info!("Scoreboard frozen");
        Ok(())
    }

    pub fn scroll(&mut self) -> Result<ScrollReport, ContestError> {
        if !self.state.is_frozen() {
            warn!("Scroll requested while not frozen");
            return Err(ContestError::NotFrozen);
        }

        self.flush();
        let frozen_board = self.standings();
        let changes = scroll_flow::run_scroll(&mut self.teams, &mut self.board);
        self.state.phase = FreezePhase::Unfrozen;
        info!("Scoreboard unfrozen");

        Ok(ScrollReport {
            frozen_board,
            changes,
            final_board: self.standings(),
        })
    }

    pub fn query_ranking(&self, team_name: &str) -> Result<RankingAnswer, ContestError> {
        let rank = self
            .board
            .rank(team_name)
            .ok_or_else(|| ContestError::UnknownTeam(team_name.to_string()))?;
        Ok(RankingAnswer {
            rank,
            provisional: self.state.is_frozen(),
        })
    }

    /// Latest settled submission of a team; `None` filters match everything.
    pub fn query_submission(
        &self,
        team_name: &str,
        problem: Option<char>,
        status: Option<SubmissionStatus>,
    ) -> Result<Option<&Submission>, ContestError> {
        let team = self
            .teams
            .get(team_name)
            .ok_or_else(|| ContestError::UnknownTeam(team_name.to_string()))?;
        Ok(team.latest_submission(problem, status))
    }

    /// Current board in display order, cells masked by the freeze where applicable.
    pub fn standings(&self) -> Vec<StandingRow> {
        let frozen = self.state.is_frozen();
        self.board
            .order()
            .iter()
            .enumerate()
            .filter_map(|(index, name)| self.teams.get(name).map(|team| (index, team)))
            .map(|(index, team)| StandingRow {
                rank: index + 1,
                team: team.name.clone(),
                solved: team.solved_count(),
                penalty: team.penalty(),
                problems: team
                    .problems()
                    .map(|(problem, status)| ProblemCell {
                        problem,
                        solved: status.solved,
                        solve_time: status.solved.then_some(status.solve_time),
                        wrong_attempts: status.wrong_attempts,
                        frozen_attempts: status.frozen_count(),
                        frozen: frozen && !status.solved && status.is_pending(),
                    })
                    .collect(),
            })
            .collect()
    }
}
