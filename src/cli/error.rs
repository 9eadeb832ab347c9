//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Usage(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(ApplicationError::Domain(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::SceneNotFound(_) => crate::exitcode::NOINPUT,
                ApplicationError::InvalidScene { .. } => crate::exitcode::DATAERR,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                ApplicationError::Domain(_) => crate::exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    #[case(CliError::Usage("x".into()), crate::exitcode::USAGE)]
    #[case(ApplicationError::SceneNotFound(PathBuf::from("a.toml")).into(), crate::exitcode::NOINPUT)]
    #[case(ApplicationError::InvalidScene { path: PathBuf::from("a.toml"), message: "bad".into() }.into(), crate::exitcode::DATAERR)]
    #[case(ApplicationError::Config { message: "bad".into() }.into(), crate::exitcode::CONFIG)]
    #[case(DomainError::DepthExceeded { limit: 1 }.into(), crate::exitcode::SOFTWARE)]
    fn given_error_when_mapping_then_sysexits_code(#[case] err: CliError, #[case] code: i32) {
        assert_eq!(err.exit_code(), code);
    }
}
