//! Errors and the context shared by command handlers.

use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use codepush_sdk::{AccountManager, ManagementError};

use crate::cli::OutputFormat;
use crate::output::Console;
use crate::prompt::Prompt;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

impl From<ManagementError> for CliError {
    fn from(error: ManagementError) -> Self {
        classify_management(error)
    }
}

/// Map a management failure onto the CLI's exit-code classes.
///
/// Requests the service rejects as malformed or conflicting are the caller's
/// fault; everything else is operational.
pub(crate) fn classify_management(error: ManagementError) -> CliError {
    let message = error.message();
    match error.status_code() {
        Some(400 | 409 | 422) => CliError::validation(message),
        Some(401) => CliError::failure(anyhow!(
            "{message} (status 401); run `codepush login` to refresh the saved access key"
        )),
        Some(status) => CliError::failure(anyhow!("{message} (status {status})")),
        None if matches!(error, ManagementError::InvalidAccessToken) => {
            CliError::validation(message)
        }
        None => CliError::failure(error),
    }
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) manager: AccountManager,
    pub(crate) prompt: Box<dyn Prompt>,
    pub(crate) console: Console,
    pub(crate) output: OutputFormat,
    pub(crate) assume_yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exit_codes_separate_validation_from_failure() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("down")).exit_code(), 3);
    }

    #[test]
    fn conflicts_are_validation_errors() {
        let err = classify_management(ManagementError::Service {
            body: json!({"message": "An app named \"Demo\" already exists."}),
            status_code: 409,
        });
        assert!(matches!(err, CliError::Validation(_)));
        assert_eq!(
            err.display_message(),
            "An app named \"Demo\" already exists."
        );
    }

    #[test]
    fn server_failures_keep_status_in_message() {
        let err = classify_management(ManagementError::Http {
            message: "Internal Server Error".into(),
            status_code: 500,
        });
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.display_message(), "Internal Server Error (status 500)");
    }

    #[test]
    fn unauthorized_suggests_login() {
        let err = classify_management(ManagementError::Http {
            message: "Unauthorized".into(),
            status_code: 401,
        });
        assert!(err.display_message().contains("codepush login"));
    }

    #[test]
    fn undecodable_token_is_validation() {
        let err = classify_management(ManagementError::InvalidAccessToken);
        assert_eq!(err.exit_code(), 2);
    }
}
