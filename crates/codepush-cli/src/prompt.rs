//! Confirmation of destructive commands.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::anyhow;

use crate::client::{AppContext, CliError, CliResult};

pub(crate) const CONFIRM_QUESTION: &str = "Are you sure? (y/N): ";

/// Source of yes/no answers for destructive commands.
pub(crate) trait Prompt: Send + Sync {
    fn confirm(&self, question: &str) -> CliResult<bool>;
}

/// Reads answers from the controlling terminal.
pub(crate) struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> CliResult<bool> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Err(CliError::validation(
                "confirmation required; pass --yes when running non-interactively",
            ));
        }

        let mut stdout = io::stdout();
        write!(stdout, "{question}")
            .and_then(|()| stdout.flush())
            .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;

        let mut answer = String::new();
        stdin
            .lock()
            .read_line(&mut answer)
            .map_err(|err| CliError::failure(anyhow!("failed to read confirmation: {err}")))?;
        Ok(is_affirmative(&answer))
    }
}

pub(crate) fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Ask before a destructive command unless `--yes` was given.
pub(crate) fn confirm_destructive(ctx: &AppContext) -> CliResult<bool> {
    if ctx.assume_yes {
        return Ok(true);
    }
    ctx.prompt.confirm(CONFIRM_QUESTION)
}
