use tracing::warn;

use crate::error::ContestError;
use crate::models::{ProblemCell, RankChange, StandingRow};
use crate::services::command_parser::Command;
use crate::services::contest_processor::ContestSystem;

fn render_cell(cell: &ProblemCell) -> String {
    match (cell.frozen, cell.solved, cell.wrong_attempts) {
        (true, _, 0) => format!("0/{}", cell.frozen_attempts),
        (true, _, wrong) => format!("-{}/{}", wrong, cell.frozen_attempts),
        (false, true, 0) => "+".to_string(),
        (false, true, wrong) => format!("+{}", wrong),
        (false, false, 0) => ".".to_string(),
        (false, false, wrong) => format!("-{}", wrong),
    }
}

pub fn render_row(row: &StandingRow) -> String {
    let mut line = format!("{} {} {} {}", row.team, row.rank, row.solved, row.penalty);
    for cell in &row.problems {
        line.push(' ');
        line.push_str(&render_cell(cell));
    }
    line
}

pub fn render_change(change: &RankChange) -> String {
    format!(
        "{} {} {} {}",
        change.team, change.displaced, change.solved, change.penalty
    )
}

/// Logs a rejected command with its error class and builds the `[Error]` reply.
fn rejected(action: &str, err: &ContestError) -> String {
    warn!(kind = ?err.kind(), "{} rejected: {:?}", action, err);
    format!("[Error]{action} failed: {err}.")
}

/// Runs one command and returns the lines to print.
pub fn execute(system: &mut ContestSystem, command: &Command) -> Vec<String> {
    let mut out = Vec::new();
    match command {
        Command::AddTeam { name } => match system.add_team(name) {
            Ok(()) => out.push("[Info]Add successfully.".to_string()),
            Err(err) => out.push(rejected("Add", &err)),
        },
        Command::Start {
            duration,
            problem_count,
        } => match system.start(*duration, *problem_count) {
            Ok(()) => out.push("[Info]Competition starts.".to_string()),
            Err(err) => out.push(rejected("Start", &err)),
        },
        Command::Submit {
            problem,
            team,
            status,
            time,
        } => {
            // the protocol has no reply for submissions, failures only reach the log
            if let Err(err) = system.submit(*problem, team, *status, *time) {
                warn!(kind = ?err.kind(), "Submit {} by {} ignored: {}", problem, team, err);
            }
        }
        Command::Flush => {
            system.flush();
            out.push("[Info]Flush scoreboard.".to_string());
        }
        Command::Freeze => match system.freeze() {
            Ok(()) => out.push("[Info]Freeze scoreboard.".to_string()),
            Err(err) => out.push(rejected("Freeze", &err)),
        },
        Command::Scroll => match system.scroll() {
            Ok(report) => {
                out.push("[Info]Scroll scoreboard.".to_string());
                out.extend(report.frozen_board.iter().map(render_row));
                out.extend(report.changes.iter().map(render_change));
                out.extend(report.final_board.iter().map(render_row));
            }
            Err(err) => out.push(rejected("Scroll", &err)),
        },
        Command::QueryRanking { team } => match system.query_ranking(team) {
            Ok(answer) => {
                out.push("[Info]Complete query ranking.".to_string());
                if answer.provisional {
                    out.push(
                        "[Warning]Scoreboard is frozen. The ranking may be inaccurate until it were scrolled."
                            .to_string(),
                    );
                }
                out.push(format!("{} NOW AT RANKING {}", team, answer.rank));
            }
            Err(err) => out.push(rejected("Query ranking", &err)),
        },
        Command::QuerySubmission {
            team,
            problem,
            status,
        } => match system.query_submission(team, *problem, *status) {
            Ok(found) => {
                out.push("[Info]Complete query submission.".to_string());
                out.push(match found {
                    Some(submission) => format!(
                        "{} {} {} {}",
                        team, submission.problem, submission.status, submission.time
                    ),
                    None => "Cannot find any submission.".to_string(),
                });
            }
            Err(err) => out.push(rejected("Query submission", &err)),
        },
        Command::End => out.push("[Info]Competition ends.".to_string()),
    }
    out
}
