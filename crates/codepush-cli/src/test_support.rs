//! Fixtures shared by handler tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use codepush_sdk::{AccountManager, ClientOptions, FileAccess};
use httpmock::MockServer;

use crate::cli::OutputFormat;
use crate::client::AppContext;
use crate::output::Console;
use crate::output::capture::SharedBuffer;
use crate::prompt::scripted::ScriptedPrompt;

pub(crate) struct Harness {
    pub(crate) ctx: AppContext,
    pub(crate) output: SharedBuffer,
    asked: Arc<AtomicUsize>,
}

impl Harness {
    pub(crate) fn prompts(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }

    pub(crate) fn with_file_access(mut self, files: Arc<dyn FileAccess>) -> Self {
        self.ctx.manager = self.ctx.manager.with_file_access(files);
        self
    }
}

/// Context against `server` whose prompt always gives `answer`.
pub(crate) fn harness(server: &MockServer, answer: bool) -> Harness {
    let server_url = server.base_url().parse().expect("mock server URL");
    let manager =
        AccountManager::new(server_url, ClientOptions::default()).expect("account manager");
    let (prompt, asked) = ScriptedPrompt::answering(answer);
    let output = SharedBuffer::default();
    Harness {
        ctx: AppContext {
            manager,
            prompt: Box::new(prompt),
            console: Console::from_writer(output.clone()),
            output: OutputFormat::Table,
            assume_yes: false,
        },
        output,
        asked,
    }
}
