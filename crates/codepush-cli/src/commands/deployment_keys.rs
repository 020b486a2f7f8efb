use crate::cli::{DeploymentKeyAddArgs, DeploymentKeyRemoveArgs, DeploymentRefArgs};
use crate::client::{AppContext, CliResult};
use crate::commands::required;
use crate::output::render_deployment_keys;
use crate::prompt::confirm_destructive;
use crate::resolve::{app_deployment_named, deployment_key_named};

pub(crate) async fn handle_deployment_key_add(
    ctx: &AppContext,
    args: DeploymentKeyAddArgs,
) -> CliResult<()> {
    let name = required(&args.name, "deployment key name")?;
    let (app, deployment) = app_deployment_named(ctx, &args.app, &args.deployment).await?;
    let created = ctx
        .manager
        .add_deployment_key(&app.id, &deployment.id, name, args.description.as_deref())
        .await?;
    ctx.console.line(format!(
        "Successfully added the \"{name}\" deployment key to the \"{}\" deployment.",
        deployment.name
    ))?;

    // The create response carries only a location; the token is on the record.
    let Some(created) = created else {
        return Ok(());
    };
    let stored = ctx
        .manager
        .get_deployment_key(&app.id, &deployment.id, &created.id)
        .await?;
    if let Some(token) = stored.and_then(|key| key.key) {
        ctx.console.line(format!("Key: {token}"))?;
    }
    Ok(())
}

pub(crate) async fn handle_deployment_key_list(
    ctx: &AppContext,
    args: DeploymentRefArgs,
) -> CliResult<()> {
    let (app, deployment) = app_deployment_named(ctx, &args.app, &args.deployment).await?;
    let keys = ctx
        .manager
        .get_deployment_keys(&app.id, &deployment.id)
        .await?;
    render_deployment_keys(&ctx.console, &keys, ctx.output)
}

pub(crate) async fn handle_deployment_key_remove(
    ctx: &AppContext,
    args: DeploymentKeyRemoveArgs,
) -> CliResult<()> {
    let (app, deployment) = app_deployment_named(ctx, &args.app, &args.deployment).await?;
    let key = deployment_key_named(ctx, &app, &deployment, &args.name).await?;
    if !confirm_destructive(ctx)? {
        return ctx.console.line("Deployment key removal cancelled.");
    }
    ctx.manager
        .remove_deployment_key(&app.id, &deployment.id, &key.id)
        .await?;
    ctx.console.line(format!(
        "Successfully removed the \"{}\" deployment key from the \"{}\" deployment.",
        key.name, deployment.name
    ))
}
