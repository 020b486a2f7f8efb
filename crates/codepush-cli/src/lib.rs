#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line front-end for the release-management service.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: command handlers grouped by resource
//! - `client.rs`: errors and the context shared by handlers
//! - `connection.rs`: the saved connection file
//! - `prompt.rs`: confirmation of destructive commands
//! - `resolve.rs`: name to identifier lookups
//! - `output.rs`: renderers and the console sink
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod connection;
pub(crate) mod output;
pub(crate) mod prompt;
pub(crate) mod resolve;
#[cfg(test)]
mod test_support;

pub use cli::run;
