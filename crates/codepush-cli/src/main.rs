//! `codepush` binary entrypoint.

use std::process;

#[tokio::main]
async fn main() {
    let code = codepush_cli::run().await;
    process::exit(code);
}
