//! Saved connection file holding the server URL and access key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::client::{CliError, CliResult};

/// Persisted login established by `codepush login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Connection {
    pub(crate) server_url: String,
    pub(crate) access_key: String,
}

/// `<config dir>/codepush/connection.json`.
pub(crate) fn default_connection_path() -> CliResult<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        CliError::failure(anyhow!(
            "could not determine the configuration directory; pass --config-file"
        ))
    })?;
    Ok(config_dir.join("codepush").join("connection.json"))
}

/// Read the connection file; a missing file is not an error.
pub(crate) fn load_connection(path: &Path) -> CliResult<Option<Connection>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(CliError::failure(anyhow!(
                "failed to read connection file '{}': {err}",
                path.display()
            )));
        }
    };
    serde_json::from_str(&text).map(Some).map_err(|err| {
        CliError::validation(format!(
            "connection file '{}' is malformed ({err}); run `codepush login` again",
            path.display()
        ))
    })
}

pub(crate) fn save_connection(path: &Path, connection: &Connection) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            CliError::failure(anyhow!(
                "failed to create configuration directory '{}': {err}",
                parent.display()
            ))
        })?;
    }
    let contents = serde_json::to_string_pretty(connection)
        .map_err(|err| CliError::failure(anyhow!("failed to serialise connection: {err}")))?;
    fs::write(path, contents).map_err(|err| {
        CliError::failure(anyhow!(
            "failed to write connection file '{}': {err}",
            path.display()
        ))
    })?;
    tracing::debug!(path = %path.display(), "connection saved");
    Ok(())
}

/// Delete the connection file; returns whether one existed.
pub(crate) fn remove_connection(path: &Path) -> CliResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(CliError::failure(anyhow!(
            "failed to delete connection file '{}': {err}",
            path.display()
        ))),
    }
}
