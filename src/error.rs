use thiserror::Error;

/// Coarse failure classes reported back to the caller. None of them is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PreconditionViolation,
    NotFound,
    DuplicateEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContestError {
    #[error("competition has started")]
    AlreadyStarted,
    #[error("competition has not started")]
    NotStarted,
    #[error("problem count must be between 1 and {max}, got {count}")]
    InvalidProblemCount { count: usize, max: usize },
    #[error("scoreboard has been frozen")]
    AlreadyFrozen,
    #[error("scoreboard has not been frozen")]
    NotFrozen,
    #[error("duplicated team name")]
    DuplicateTeam(String),
    #[error("cannot find the team")]
    UnknownTeam(String),
    #[error("problem {0} is not part of the contest")]
    UnknownProblem(char),
}

impl ContestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContestError::AlreadyStarted
            | ContestError::NotStarted
            | ContestError::InvalidProblemCount { .. }
            | ContestError::AlreadyFrozen
            | ContestError::NotFrozen => ErrorKind::PreconditionViolation,
            ContestError::UnknownTeam(_) | ContestError::UnknownProblem(_) => ErrorKind::NotFound,
            ContestError::DuplicateTeam(_) => ErrorKind::DuplicateEntity,
        }
    }
}

/// A command line that could not be turned into a [`crate::services::command_parser::Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command line")]
    Empty,
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("{command}: missing {what}")]
    Missing {
        command: &'static str,
        what: &'static str,
    },
    #[error("{command}: expected keyword {expected:?}, found {found:?}")]
    UnexpectedKeyword {
        command: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("invalid problem {0:?}")]
    InvalidProblem(String),
    #[error("unknown submission status {0:?}")]
    UnknownStatus(String),
}
