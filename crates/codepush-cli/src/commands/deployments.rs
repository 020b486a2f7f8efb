use crate::cli::{
    DeploymentAddArgs, DeploymentListArgs, DeploymentRemoveArgs, DeploymentRenameArgs,
};
use crate::client::{AppContext, CliResult};
use crate::commands::required;
use crate::output::render_deployments;
use crate::prompt::confirm_destructive;
use crate::resolve::{app_deployment_named, app_named};

pub(crate) async fn handle_deployment_add(
    ctx: &AppContext,
    args: DeploymentAddArgs,
) -> CliResult<()> {
    let name = required(&args.name, "deployment name")?;
    let app = app_named(ctx, &args.app).await?;
    ctx.manager
        .add_deployment(&app.id, name, args.description.as_deref())
        .await?;
    ctx.console.line(format!(
        "Successfully added the \"{name}\" deployment to the \"{}\" app.",
        app.name
    ))
}

pub(crate) async fn handle_deployment_list(
    ctx: &AppContext,
    args: DeploymentListArgs,
) -> CliResult<()> {
    let app = app_named(ctx, &args.app).await?;
    let deployments = ctx.manager.get_deployments(&app.id).await?;
    render_deployments(&ctx.console, &deployments, ctx.output)
}

pub(crate) async fn handle_deployment_remove(
    ctx: &AppContext,
    args: DeploymentRemoveArgs,
) -> CliResult<()> {
    let (app, deployment) = app_deployment_named(ctx, &args.app, &args.name).await?;
    if !confirm_destructive(ctx)? {
        return ctx.console.line("Deployment removal cancelled.");
    }
    ctx.manager
        .remove_deployment(&app.id, &deployment.id)
        .await?;
    ctx.console.line(format!(
        "Successfully removed the \"{}\" deployment from the \"{}\" app.",
        deployment.name, app.name
    ))
}

pub(crate) async fn handle_deployment_rename(
    ctx: &AppContext,
    args: DeploymentRenameArgs,
) -> CliResult<()> {
    let new_name = required(&args.new_name, "new deployment name")?;
    let (app, mut deployment) = app_deployment_named(ctx, &args.app, &args.current).await?;
    deployment.name = new_name.to_string();
    ctx.manager.update_deployment(&app.id, &deployment).await?;
    ctx.console.line(format!(
        "Successfully renamed the \"{}\" deployment to \"{new_name}\".",
        args.current
    ))
}
