use std::env;

use anyhow::anyhow;

use crate::cli::{AccessKeyAddArgs, AccessKeyRemoveArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::required;
use crate::output::render_access_keys;
use crate::prompt::confirm_destructive;
use crate::resolve::access_key_named;

const FALLBACK_MACHINE_NAME: &str = "codepush-cli";

pub(crate) async fn handle_access_key_add(
    ctx: &AppContext,
    args: AccessKeyAddArgs,
) -> CliResult<()> {
    let description = required(&args.description, "access key description")?;
    let machine = args.created_by.unwrap_or_else(machine_name);
    let created = ctx
        .manager
        .add_access_key(&machine, Some(description))
        .await?
        .ok_or_else(|| {
            CliError::failure(anyhow!(
                "the service did not confirm the new access key; list keys to check whether it was stored"
            ))
        })?;
    ctx.console.line(format!(
        "Successfully created a new access key \"{description}\": {}",
        created.name
    ))
}

pub(crate) async fn handle_access_key_list(ctx: &AppContext) -> CliResult<()> {
    let keys = ctx.manager.get_access_keys().await?;
    render_access_keys(&ctx.console, &keys, ctx.output)
}

pub(crate) async fn handle_access_key_remove(
    ctx: &AppContext,
    args: AccessKeyRemoveArgs,
) -> CliResult<()> {
    let key = access_key_named(ctx, &args.name).await?;
    if !confirm_destructive(ctx)? {
        return ctx.console.line("Access key removal cancelled.");
    }
    ctx.manager.remove_access_key(&key.id).await?;
    ctx.console.line(format!(
        "Successfully removed the \"{}\" access key.",
        args.name
    ))
}

/// Host name recorded as the key's creator.
fn machine_name() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .into_iter()
        .filter_map(|var| env::var(var).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_MACHINE_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::harness;
    use httpmock::prelude::*;
    use serde_json::json;

    async fn mock_key_list(server: &MockServer) {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/accessKeys");
                then.status(200).json_body(json!({"accessKeys": [
                    {"id": "id-1", "name": "secret-one", "createdBy": "laptop", "createdTime": 1_450_000_000_000_i64},
                    {"id": "id-2", "name": "secret-two", "description": "CI"}
                ]}));
            })
            .await;
    }

    #[tokio::test]
    async fn declined_removal_sends_no_delete() {
        let server = MockServer::start_async().await;
        mock_key_list(&server).await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/accessKeys/id-2");
                then.status(204);
            })
            .await;

        let fixture = harness(&server, false);
        handle_access_key_remove(
            &fixture.ctx,
            AccessKeyRemoveArgs {
                name: "secret-two".into(),
            },
        )
        .await
        .expect("cancelled removal succeeds");

        delete.assert_calls(0);
        assert_eq!(fixture.output.contents(), "Access key removal cancelled.\n");
    }

    #[tokio::test]
    async fn confirmed_removal_deletes_by_id() {
        let server = MockServer::start_async().await;
        mock_key_list(&server).await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/accessKeys/id-2");
                then.status(204);
            })
            .await;

        let fixture = harness(&server, true);
        handle_access_key_remove(
            &fixture.ctx,
            AccessKeyRemoveArgs {
                name: "secret-two".into(),
            },
        )
        .await
        .expect("removal");

        delete.assert();
        assert_eq!(
            fixture.output.contents(),
            "Successfully removed the \"secret-two\" access key.\n"
        );
    }

    #[tokio::test]
    async fn unknown_key_is_reported() {
        let server = MockServer::start_async().await;
        mock_key_list(&server).await;

        let fixture = harness(&server, true);
        let err = handle_access_key_remove(
            &fixture.ctx,
            AccessKeyRemoveArgs {
                name: "secret-three".into(),
            },
        )
        .await
        .expect_err("unknown key");
        assert_eq!(
            err.display_message(),
            "Access key \"secret-three\" does not exist."
        );
    }

    #[tokio::test]
    async fn add_records_machine_and_prints_secret() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/accessKeys")
                    .body_includes(r#""createdBy":"build-agent""#)
                    .body_includes(r#""description":"CI""#);
                then.status(201).header("Location", "/accessKeys/id-9");
            })
            .await;

        let fixture = harness(&server, true);
        handle_access_key_add(
            &fixture.ctx,
            AccessKeyAddArgs {
                description: "CI".into(),
                created_by: Some("build-agent".into()),
            },
        )
        .await
        .expect("add");

        create.assert();
        let text = fixture.output.contents();
        let secret = text
            .trim_end()
            .strip_prefix("Successfully created a new access key \"CI\": ")
            .expect("confirmation line");
        assert_eq!(secret.len(), 32);
    }

    #[tokio::test]
    async fn add_without_location_is_a_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/accessKeys");
                then.status(201);
            })
            .await;

        let fixture = harness(&server, true);
        let err = handle_access_key_add(
            &fixture.ctx,
            AccessKeyAddArgs {
                description: "CI".into(),
                created_by: Some("build-agent".into()),
            },
        )
        .await
        .expect_err("unconfirmed key");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn machine_name_is_never_blank() {
        assert!(!machine_name().is_empty());
    }
}
