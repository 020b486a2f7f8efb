use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::anyhow;

use crate::client::{AppContext, CliError, CliResult};
use crate::connection::{Connection, remove_connection, save_connection};
use crate::output::render_account;

pub(crate) async fn handle_login(
    ctx: &mut AppContext,
    access_key: Option<String>,
    connection_path: &Path,
) -> CliResult<()> {
    let access_key = match access_key {
        Some(key) => key,
        None => read_access_key()?,
    };
    let access_key = access_key.trim();
    if access_key.is_empty() {
        return Err(CliError::validation("access key must not be empty"));
    }

    ctx.manager.login_with_access_token(access_key).await?;
    if !ctx.manager.is_authenticated().await? {
        return Err(CliError::validation(
            "the service did not accept the access key",
        ));
    }

    save_connection(
        connection_path,
        &Connection {
            server_url: ctx.manager.server_url().to_string(),
            access_key: access_key.to_string(),
        },
    )?;
    ctx.console.line(format!(
        "Successfully logged in. Your session is saved to {}.",
        connection_path.display()
    ))
}

pub(crate) async fn handle_logout(
    ctx: &mut AppContext,
    access_key: &str,
    connection_path: &Path,
) -> CliResult<()> {
    ctx.manager.login_with_access_token(access_key).await?;
    ctx.manager.logout().await?;
    remove_connection(connection_path)?;
    ctx.console.line("Successfully logged out.")
}

pub(crate) async fn handle_whoami(ctx: &AppContext) -> CliResult<()> {
    let account = ctx
        .manager
        .get_account_info()
        .await?
        .ok_or_else(|| CliError::failure(anyhow!("the service returned no account details")))?;
    render_account(&ctx.console, &account, ctx.output)
}

fn read_access_key() -> CliResult<String> {
    if !io::stdin().is_terminal() {
        return Err(CliError::validation(
            "access key is required (pass --access-key or set CODEPUSH_ACCESS_KEY)",
        ));
    }
    rpassword::prompt_password("Access key: ")
        .map_err(|err| CliError::failure(anyhow!("failed to read access key: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::load_connection;
    use crate::test_support::harness;
    use codepush_sdk::AccessToken;
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn token() -> String {
        AccessToken {
            provider_name: "GitHub".into(),
            provider_unique_id: "1234".into(),
            access_key_name: "secret-key".into(),
        }
        .encode()
        .expect("encode token")
    }

    async fn mock_login(server: &MockServer) -> httpmock::Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/login/accessToken")
                    .form_urlencoded_tuple("token", "secret-key");
                then.status(200)
                    .header("set-cookie", "session=abc; Path=/");
            })
            .await
    }

    #[tokio::test]
    async fn login_verifies_and_saves_connection() {
        let server = MockServer::start_async().await;
        let login = mock_login(&server).await;
        let check = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/authenticated")
                    .header("cookie", "session=abc");
                then.status(200);
            })
            .await;

        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("connection.json");
        let mut fixture = harness(&server, true);
        handle_login(&mut fixture.ctx, Some(token()), &path)
            .await
            .expect("login");

        login.assert();
        check.assert();
        let saved = load_connection(&path).expect("load").expect("saved");
        assert_eq!(saved.access_key, token());
        assert_eq!(saved.server_url, format!("{}/", server.base_url()));
        assert!(
            fixture
                .output
                .contents()
                .starts_with("Successfully logged in.")
        );
    }

    #[tokio::test]
    async fn rejected_login_saves_nothing() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/authenticated");
                then.status(401);
            })
            .await;

        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("connection.json");
        let mut fixture = harness(&server, true);
        let err = handle_login(&mut fixture.ctx, Some(token()), &path)
            .await
            .expect_err("rejected");

        assert_eq!(err.exit_code(), 2);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn malformed_token_sends_no_request() {
        let server = MockServer::start_async().await;
        let login = mock_login(&server).await;

        let dir = TempDir::new().expect("tempdir");
        let mut fixture = harness(&server, true);
        let err = handle_login(
            &mut fixture.ctx,
            Some("not-a-token".into()),
            &dir.path().join("connection.json"),
        )
        .await
        .expect_err("malformed");

        login.assert_calls(0);
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn logout_ends_session_and_deletes_connection() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        let logout = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/logout")
                    .header("cookie", "session=abc");
                then.status(200);
            })
            .await;

        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("connection.json");
        save_connection(
            &path,
            &Connection {
                server_url: server.base_url(),
                access_key: token(),
            },
        )
        .expect("seed connection");

        let mut fixture = harness(&server, true);
        handle_logout(&mut fixture.ctx, &token(), &path)
            .await
            .expect("logout");

        logout.assert();
        assert!(!path.exists());
        assert!(fixture.ctx.manager.session().is_none());
        assert_eq!(fixture.output.contents(), "Successfully logged out.\n");
    }

    #[tokio::test]
    async fn whoami_prints_account() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/account");
                then.status(200).json_body(json!({"account": {
                    "username": "release-bot",
                    "email": "bot@example.com"
                }}));
            })
            .await;

        let fixture = harness(&server, true);
        handle_whoami(&fixture.ctx).await.expect("whoami");
        assert_eq!(
            fixture.output.contents(),
            "release-bot <bot@example.com>\n"
        );
    }
}
