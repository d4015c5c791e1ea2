use std::str::{FromStr, SplitWhitespace};

use crate::error::CommandError;
use crate::models::{ContestTime, SubmissionStatus};

const MATCH_ALL: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddTeam {
        name: String,
    },
    Start {
        duration: ContestTime,
        problem_count: usize,
    },
    Submit {
        problem: char,
        team: String,
        status: SubmissionStatus,
        time: ContestTime,
    },
    Flush,
    Freeze,
    Scroll,
    QueryRanking {
        team: String,
    },
    QuerySubmission {
        team: String,
        /// `None` matches every problem.
        problem: Option<char>,
        /// `None` matches every status.
        status: Option<SubmissionStatus>,
    },
    End,
}

struct Tokens<'a> {
    command: &'static str,
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn next(&mut self, what: &'static str) -> Result<&'a str, CommandError> {
        self.inner.next().ok_or(CommandError::Missing {
            command: self.command,
            what,
        })
    }

    fn keyword(&mut self, expected: &'static str) -> Result<(), CommandError> {
        let found = self.next(expected)?;
        if found != expected {
            return Err(CommandError::UnexpectedKeyword {
                command: self.command,
                expected,
                found: found.to_string(),
            });
        }
        Ok(())
    }

    fn number<T: FromStr>(&mut self, what: &'static str) -> Result<T, CommandError> {
        let raw = self.next(what)?;
        raw.parse()
            .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
    }

    /// `KEY=value` in a single token.
    fn assignment(&mut self, key: &'static str) -> Result<&'a str, CommandError> {
        let raw = self.next(key)?;
        raw.strip_prefix(key)
            .and_then(|rest| rest.strip_prefix('='))
            .ok_or_else(|| CommandError::UnexpectedKeyword {
                command: self.command,
                expected: key,
                found: raw.to_string(),
            })
    }
}

fn parse_problem(raw: &str) -> Result<char, CommandError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_uppercase() => Ok(letter),
        _ => Err(CommandError::InvalidProblem(raw.to_string())),
    }
}

fn parse_filter<T>(
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, CommandError>,
) -> Result<Option<T>, CommandError> {
    if raw == MATCH_ALL {
        Ok(None)
    } else {
        parse(raw).map(Some)
    }
}

fn parse_start(mut tokens: Tokens<'_>) -> Result<Command, CommandError> {
    tokens.keyword("DURATION")?;
    let duration = tokens.number("duration")?;
    tokens.keyword("PROBLEM")?;
    let problem_count = tokens.number("problem count")?;
    Ok(Command::Start {
        duration,
        problem_count,
    })
}

fn parse_submit(mut tokens: Tokens<'_>) -> Result<Command, CommandError> {
    let problem = parse_problem(tokens.next("problem")?)?;
    tokens.keyword("BY")?;
    let team = tokens.next("team name")?.to_string();
    tokens.keyword("WITH")?;
    let status: SubmissionStatus = tokens.next("status")?.parse()?;
    tokens.keyword("AT")?;
    let time = tokens.number("time")?;
    Ok(Command::Submit {
        problem,
        team,
        status,
        time,
    })
}

fn parse_query_submission(mut tokens: Tokens<'_>) -> Result<Command, CommandError> {
    let team = tokens.next("team name")?.to_string();
    tokens.keyword("WHERE")?;
    let problem = parse_filter(tokens.assignment("PROBLEM")?, parse_problem)?;
    tokens.keyword("AND")?;
    let status = parse_filter(tokens.assignment("STATUS")?, SubmissionStatus::from_str)?;
    Ok(Command::QuerySubmission {
        team,
        problem,
        status,
    })
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };
    let tokens = |command: &'static str| Tokens {
        command,
        inner: words,
    };

    match head {
        "ADDTEAM" => Ok(Command::AddTeam {
            name: tokens("ADDTEAM").next("team name")?.to_string(),
        }),
        "START" => parse_start(tokens("START")),
        "SUBMIT" => parse_submit(tokens("SUBMIT")),
        "FLUSH" => Ok(Command::Flush),
        "FREEZE" => Ok(Command::Freeze),
        "SCROLL" => Ok(Command::Scroll),
        "QUERY_RANKING" => Ok(Command::QueryRanking {
            team: tokens("QUERY_RANKING").next("team name")?.to_string(),
        }),
        "QUERY_SUBMISSION" => parse_query_submission(tokens("QUERY_SUBMISSION")),
        "END" => Ok(Command::End),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("FLUSH"), Ok(Command::Flush));
        assert_eq!(parse_command("  FREEZE  "), Ok(Command::Freeze));
        assert_eq!(parse_command("SCROLL"), Ok(Command::Scroll));
        assert_eq!(parse_command("END"), Ok(Command::End));
        assert_eq!(
            parse_command("ADDTEAM team_1"),
            Ok(Command::AddTeam {
                name: "team_1".to_string()
            })
        );
        assert_eq!(
            parse_command("QUERY_RANKING team_1"),
            Ok(Command::QueryRanking {
                team: "team_1".to_string()
            })
        );
    }

    #[test]
    fn test_parse_start_and_submit() {
        assert_eq!(
            parse_command("START DURATION 300 PROBLEM 12"),
            Ok(Command::Start {
                duration: 300,
                problem_count: 12
            })
        );
        assert_eq!(
            parse_command("SUBMIT C BY lambda WITH Runtime_Error AT 42"),
            Ok(Command::Submit {
                problem: 'C',
                team: "lambda".to_string(),
                status: SubmissionStatus::RuntimeError,
                time: 42,
            })
        );
    }

    #[test]
    fn test_parse_query_submission_filters() {
        assert_eq!(
            parse_command("QUERY_SUBMISSION t WHERE PROBLEM=ALL AND STATUS=ALL"),
            Ok(Command::QuerySubmission {
                team: "t".to_string(),
                problem: None,
                status: None,
            })
        );
        assert_eq!(
            parse_command("QUERY_SUBMISSION t WHERE PROBLEM=B AND STATUS=Accepted"),
            Ok(Command::QuerySubmission {
                team: "t".to_string(),
                problem: Some('B'),
                status: Some(SubmissionStatus::Accepted),
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("RESTART"),
            Err(CommandError::UnknownCommand("RESTART".to_string()))
        );
        assert!(matches!(
            parse_command("START DURATION x PROBLEM 3"),
            Err(CommandError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_command("START LENGTH 3 PROBLEM 3"),
            Err(CommandError::UnexpectedKeyword {
                expected: "DURATION",
                ..
            })
        ));
        assert!(matches!(
            parse_command("SUBMIT AB BY t WITH Accepted AT 1"),
            Err(CommandError::InvalidProblem(_))
        ));
        assert!(matches!(
            parse_command("SUBMIT A BY t WITH Pending AT 1"),
            Err(CommandError::UnknownStatus(_))
        ));
        assert!(matches!(
            parse_command("SUBMIT A BY t"),
            Err(CommandError::Missing { what: "WITH", .. })
        ));
        assert!(matches!(
            parse_command("QUERY_SUBMISSION t WHERE STATUS=ALL AND PROBLEM=ALL"),
            Err(CommandError::UnexpectedKeyword {
                expected: "PROBLEM",
                ..
            })
        ));
    }
}
