//! Resolution of human-facing names to server-assigned records.
//!
//! Every lookup lists the parent collection and keeps the first record whose
//! name matches exactly; the service guarantees nothing about uniqueness.

use codepush_api_models::{AccessKey, App, Deployment, DeploymentKey};

use crate::client::{AppContext, CliError, CliResult};

pub(crate) fn find_named<T>(
    records: Vec<T>,
    name: &str,
    name_of: impl Fn(&T) -> &str,
) -> Option<T> {
    records.into_iter().find(|record| name_of(record) == name)
}

pub(crate) async fn app_named(ctx: &AppContext, name: &str) -> CliResult<App> {
    let apps = ctx.manager.get_apps().await?;
    find_named(apps, name, |app| app.name.as_str())
        .ok_or_else(|| CliError::validation(format!("App \"{name}\" does not exist.")))
}

pub(crate) async fn deployment_named(
    ctx: &AppContext,
    app: &App,
    name: &str,
) -> CliResult<Deployment> {
    let deployments = ctx.manager.get_deployments(&app.id).await?;
    find_named(deployments, name, |deployment| deployment.name.as_str())
        .ok_or_else(|| CliError::validation(format!("Deployment \"{name}\" does not exist.")))
}

/// Resolve an app and one of its deployments in a single step.
pub(crate) async fn app_deployment_named(
    ctx: &AppContext,
    app_name: &str,
    deployment_name: &str,
) -> CliResult<(App, Deployment)> {
    let app = app_named(ctx, app_name).await?;
    let deployment = deployment_named(ctx, &app, deployment_name).await?;
    Ok((app, deployment))
}

pub(crate) async fn deployment_key_named(
    ctx: &AppContext,
    app: &App,
    deployment: &Deployment,
    name: &str,
) -> CliResult<DeploymentKey> {
    let keys = ctx
        .manager
        .get_deployment_keys(&app.id, &deployment.id)
        .await?;
    find_named(keys, name, |key| key.name.as_str())
        .ok_or_else(|| CliError::validation(format!("Deployment key \"{name}\" does not exist.")))
}

pub(crate) async fn access_key_named(ctx: &AppContext, name: &str) -> CliResult<AccessKey> {
    let keys = ctx.manager.get_access_keys().await?;
    find_named(keys, name, |key| key.name.as_str())
        .ok_or_else(|| CliError::validation(format!("Access key \"{name}\" does not exist.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::harness;
    use httpmock::prelude::*;
    use serde_json::json;

    fn app(id: &str, name: &str) -> App {
        App {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    #[test]
    fn find_named_requires_exact_match() {
        let apps = vec![app("1", "demo"), app("2", "Demo ")];
        assert!(find_named(apps, "Demo", |app| app.name.as_str()).is_none());
    }

    #[test]
    fn find_named_keeps_first_duplicate() {
        let apps = vec![app("1", "Other"), app("2", "Demo"), app("3", "Demo")];
        let found = find_named(apps, "Demo", |app| app.name.as_str()).expect("match");
        assert_eq!(found.id, "2");
    }

    #[tokio::test]
    async fn missing_app_reports_not_found() {
        let server = MockServer::start_async().await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET).path("/apps");
                then.status(200)
                    .json_body(json!({"apps": [{"id": "a1", "name": "Other"}]}));
            })
            .await;

        let fixture = harness(&server, true);
        let err = app_named(&fixture.ctx, "Demo").await.expect_err("not found");
        list.assert();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "App \"Demo\" does not exist.");
    }

    #[tokio::test]
    async fn deployment_lookup_scopes_to_resolved_app() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/apps");
                then.status(200)
                    .json_body(json!({"apps": [{"id": "a9", "name": "Demo"}]}));
            })
            .await;
        let deployments = server
            .mock_async(|when, then| {
                when.method(GET).path("/apps/a9/deployments");
                then.status(200).json_body(json!({"deployments": [
                    {"id": "d1", "name": "Staging"},
                    {"id": "d2", "name": "Production"}
                ]}));
            })
            .await;

        let fixture = harness(&server, true);
        let (app, deployment) = app_deployment_named(&fixture.ctx, "Demo", "Production")
            .await
            .expect("resolved");
        deployments.assert();
        assert_eq!(app.id, "a9");
        assert_eq!(deployment.id, "d2");
    }

    #[tokio::test]
    async fn missing_deployment_key_reports_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/apps/a1/deployments/d1/deploymentKeys");
                then.status(200).json_body(json!({"deploymentKeys": []}));
            })
            .await;

        let fixture = harness(&server, true);
        let err = deployment_key_named(
            &fixture.ctx,
            &app("a1", "Demo"),
            &Deployment {
                id: "d1".into(),
                name: "Staging".into(),
                ..Deployment::default()
            },
            "ci",
        )
        .await
        .expect_err("not found");
        assert_eq!(err.display_message(), "Deployment key \"ci\" does not exist.");
    }
}
