use crate::cli::{AppAddArgs, AppRemoveArgs, AppRenameArgs};
use crate::client::{AppContext, CliResult};
use crate::commands::required;
use crate::output::render_apps;
use crate::prompt::confirm_destructive;
use crate::resolve::app_named;

pub(crate) async fn handle_app_add(ctx: &AppContext, args: AppAddArgs) -> CliResult<()> {
    let name = required(&args.name, "app name")?;
    let created = ctx
        .manager
        .add_app(name, args.description.as_deref())
        .await?;
    tracing::debug!(app = name, id = ?created.map(|app| app.id), "app added");
    ctx.console
        .line(format!("Successfully added the \"{name}\" app."))
}

pub(crate) async fn handle_app_list(ctx: &AppContext) -> CliResult<()> {
    let apps = ctx.manager.get_apps().await?;
    render_apps(&ctx.console, &apps, ctx.output)
}

pub(crate) async fn handle_app_remove(ctx: &AppContext, args: AppRemoveArgs) -> CliResult<()> {
    let app = app_named(ctx, &args.name).await?;
    if !confirm_destructive(ctx)? {
        return ctx.console.line("App removal cancelled.");
    }
    ctx.manager.remove_app(&app.id).await?;
    ctx.console
        .line(format!("Successfully removed the \"{}\" app.", args.name))
}

pub(crate) async fn handle_app_rename(ctx: &AppContext, args: AppRenameArgs) -> CliResult<()> {
    let new_name = required(&args.new_name, "new app name")?;
    let mut app = app_named(ctx, &args.current).await?;
    app.name = new_name.to_string();
    ctx.manager.update_app(&app).await?;
    ctx.console.line(format!(
        "Successfully renamed the \"{}\" app to \"{new_name}\".",
        args.current
    ))
}
