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
#![allow(clippy::module_name_repetitions)]

//! Management client for the release-management REST API.
//!
//! Layout:
//! - `manager.rs`: `AccountManager`, one method per REST operation
//! - `response.rs`: success/failure classification and body decoding
//! - `session.rs`: credential modes and the authenticated session
//! - `files.rs`: package sources and the file access capability
//! - `token.rs`: access token decoding
//! - `error.rs`: `ManagementError`

pub mod error;
pub mod files;
pub mod manager;
pub(crate) mod response;
pub mod session;
pub mod token;

pub use codepush_api_models as models;
pub use error::{ManagementError, ManagementResult, PARSE_FAILURE_PREFIX};
pub use files::{FileAccess, LocalFileAccess, PackageBlob, PackageSource};
pub use manager::AccountManager;
pub use session::{ClientOptions, CredentialMode, DEFAULT_USER_AGENT, Session};
pub use token::AccessToken;
