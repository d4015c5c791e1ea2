use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::screens::console;
use crate::services::command_parser::{Command, parse_command};
use crate::services::contest_processor::ContestSystem;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub lines_read: u64,
    pub error_count: u64,
    /// `END` was seen before input ran out.
    pub ended: bool,
}

/// Feeds every command line to the contest and writes the replies, stopping at `END`.
/// Malformed lines are logged and skipped.
pub fn run_session<R, W>(system: &mut ContestSystem, input: R, mut output: W) -> Result<SessionSummary>
where
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();

    for line_result in input.lines() {
        let line = line_result
            .with_context(|| format!("Failed while reading line {}", summary.lines_read + 1))?;
        summary.lines_read += 1;

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                warn!("Line {}: {}", summary.lines_read, err);
                summary.error_count += 1;
                continue;
            }
        };
        debug!("Line {}: {:?}", summary.lines_read, command);

        for reply in console::execute(system, &command) {
            writeln!(output, "{reply}").context("Failed to write command output")?;
        }

        if command == Command::End {
            summary.ended = true;
            break;
        }
    }

    output.flush().context("Failed to flush command output")?;
    info!(
        "Session finished: {} lines, {} malformed, ended by command: {}",
        summary.lines_read, summary.error_count, summary.ended
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::services::config_loader::ScoreboardConfig;

    #[test]
    fn test_session_stops_at_end_and_skips_bad_lines() {
        let input = "ADDTEAM a\nBOGUS\n\nSTART DURATION 10 PROBLEM 1\nEND\nADDTEAM late\n";
        let mut system = ContestSystem::new(ScoreboardConfig::default());
        let mut output = Vec::new();

        let summary = run_session(&mut system, Cursor::new(input), &mut output).unwrap();

        assert_eq!(
            summary,
            SessionSummary {
                lines_read: 5,
                error_count: 2,
                ended: true,
            }
        );
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "[Info]Add successfully.\n[Info]Competition starts.\n[Info]Competition ends.\n"
        );
        assert!(system.team("late").is_none());
    }

    #[test]
    fn test_session_without_end_consumes_all_input() {
        let mut system = ContestSystem::new(ScoreboardConfig::default());
        let mut output = Vec::new();
        let summary = run_session(&mut system, Cursor::new("ADDTEAM a\nFLUSH"), &mut output).unwrap();

        assert!(!summary.ended);
        assert_eq!(summary.lines_read, 2);
        assert_eq!(system.board().order(), ["a"]);
    }
}
