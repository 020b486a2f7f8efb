use codepush_api_models::PackageInfo;
use codepush_sdk::{ManagementError, PackageSource};

use crate::cli::{DeploymentRefArgs, ReleaseArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::required;
use crate::output::render_package;
use crate::resolve::app_deployment_named;

pub(crate) async fn handle_release(ctx: &AppContext, args: ReleaseArgs) -> CliResult<()> {
    let app_version = required(&args.app_version, "app version")?;
    let blob = ctx
        .manager
        .open_package(&args.package)
        .await
        .map_err(|err| match err {
            ManagementError::Io {
                operation: "open", ..
            } => CliError::validation(format!(
                "Package file \"{}\" does not exist.",
                args.package.display()
            )),
            other => CliError::from(other),
        })?;

    let (app, deployment) = app_deployment_named(ctx, &args.app, &args.deployment).await?;
    let info = PackageInfo {
        description: args.description,
        label: args.label,
        app_version: app_version.to_string(),
        is_mandatory: args.mandatory,
    };
    tracing::info!(
        app = %app.name,
        deployment = %deployment.name,
        path = %args.package.display(),
        "uploading package"
    );
    ctx.manager
        .add_package(
            &app.id,
            &deployment.id,
            PackageSource::Blob(blob),
            &info,
        )
        .await?;
    ctx.console.line(format!(
        "Successfully released an update to the \"{}\" deployment of the \"{}\" app.",
        deployment.name, app.name
    ))
}

pub(crate) async fn handle_package_show(ctx: &AppContext, args: DeploymentRefArgs) -> CliResult<()> {
    let (app, deployment) = app_deployment_named(ctx, &args.app, &args.deployment).await?;
    match ctx.manager.get_package(&app.id, &deployment.id).await? {
        Some(package) => render_package(&ctx.console, &package, ctx.output),
        None => ctx.console.line(format!(
            "No package has been released to the \"{}\" deployment.",
            deployment.name
        )),
    }
}
