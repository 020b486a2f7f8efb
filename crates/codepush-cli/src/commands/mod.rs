//! Command handlers grouped by resource.

pub(crate) mod access_keys;
pub(crate) mod apps;
pub(crate) mod deployment_keys;
pub(crate) mod deployments;
pub(crate) mod packages;
pub(crate) mod session;

use crate::client::{CliError, CliResult};

/// Trim `value`, rejecting blanks with a message naming `what`.
pub(crate) fn required<'a>(value: &'a str, what: &str) -> CliResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CliError::validation(format!("{what} must not be empty")));
    }
    Ok(trimmed)
}
