//! Credential attachment and the authenticated session lifecycle.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore as _, Jar};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, SET_COOKIE, USER_AGENT};
use reqwest::{Client, Url};

use crate::error::{ManagementError, ManagementResult};

/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("codepush-sdk/", env!("CARGO_PKG_VERSION"));

/// How credentials ride along with requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialMode {
    /// Keep an explicit [`Session`] populated by login/authentication checks.
    #[default]
    Session,
    /// Keep no session; every request uses a client with an ambient cookie store.
    Ambient,
}

/// Construction options for [`crate::AccountManager`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Credential attachment policy.
    pub credential_mode: CredentialMode,
    /// Optional whole-request timeout.
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credential_mode: CredentialMode::default(),
            timeout: None,
        }
    }
}

impl ClientOptions {
    pub(crate) fn default_headers(&self) -> ManagementResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&self.user_agent).map_err(|_| {
            ManagementError::InvalidUserAgent {
                value: self.user_agent.clone(),
            }
        })?;
        headers.insert(USER_AGENT, agent);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Client used before a session exists, or for every request in ambient mode.
    pub(crate) fn base_client(&self) -> ManagementResult<Client> {
        let mut builder = Client::builder().default_headers(self.default_headers()?);
        if self.credential_mode == CredentialMode::Ambient {
            builder = builder.cookie_store(true);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|source| ManagementError::ClientBuild { source })
    }
}

/// Cookie-bearing client established by a login or a successful authentication check.
#[derive(Debug, Clone)]
pub struct Session {
    jar: Arc<Jar>,
    client: Client,
    cookie_count: usize,
}

impl Session {
    /// Build a fresh session from the `Set-Cookie` headers of a response.
    ///
    /// The previous session, if any, is replaced rather than merged.
    pub(crate) fn from_headers(
        server_url: &Url,
        headers: &HeaderMap,
        options: &ClientOptions,
    ) -> ManagementResult<Self> {
        let jar = Arc::new(Jar::default());
        for value in headers.get_all(SET_COOKIE) {
            if let Ok(cookie) = value.to_str() {
                jar.add_cookie_str(cookie, server_url);
            }
        }
        let cookie_count = stored_cookie_count(&jar, server_url);

        let mut builder = Client::builder()
            .default_headers(options.default_headers()?)
            .cookie_provider(Arc::clone(&jar));
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| ManagementError::ClientBuild { source })?;

        Ok(Self {
            jar,
            client,
            cookie_count,
        })
    }

    /// Client that attaches the session cookies.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Number of cookies the jar accepted for the server when the session was established.
    #[must_use]
    pub const fn cookie_count(&self) -> usize {
        self.cookie_count
    }

    /// Render the `Cookie` header the session sends to `url`.
    #[must_use]
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.jar
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }
}

/// Cookies the jar would send back to `url`; rejected `Set-Cookie` values are not counted.
fn stored_cookie_count(jar: &Jar, url: &Url) -> usize {
    jar.cookies(url)
        .and_then(|value| {
            value
                .to_str()
                .ok()
                .map(|header| header.split("; ").filter(|pair| !pair.is_empty()).count())
        })
        .unwrap_or(0)
}

/// Whether a response carries any `Set-Cookie` header.
pub(crate) fn sets_cookies(headers: &HeaderMap) -> bool {
    headers.get_all(SET_COOKIE).iter().next().is_some()
}
