//! Command-line parsing and dispatch for the `codepush` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use codepush_sdk::{AccountManager, ClientOptions, CredentialMode};
use codepush_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use url::Url;

use crate::client::{AppContext, CliError, CliResult};
use crate::commands::access_keys::{
    handle_access_key_add, handle_access_key_list, handle_access_key_remove,
};
use crate::commands::apps::{handle_app_add, handle_app_list, handle_app_remove, handle_app_rename};
use crate::commands::deployment_keys::{
    handle_deployment_key_add, handle_deployment_key_list, handle_deployment_key_remove,
};
use crate::commands::deployments::{
    handle_deployment_add, handle_deployment_list, handle_deployment_remove,
    handle_deployment_rename,
};
use crate::commands::packages::{handle_package_show, handle_release};
use crate::commands::session::{handle_login, handle_logout, handle_whoami};
use crate::connection::{Connection, default_connection_path, load_connection};
use crate::output::Console;
use crate::prompt::TerminalPrompt;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
const USER_AGENT: &str = concat!("codepush-cli/", env!("CARGO_PKG_VERSION"));

/// Parses CLI arguments, executes the requested command, and reports failures.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    install_logging(&cli);
    let command_name = command_label(&cli.command);

    match dispatch(cli).await {
        Ok(()) => {
            tracing::debug!(command = command_name, "command completed");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            tracing::debug!(command = command_name, exit_code, "command failed");
            eprintln!("error: {}", err.display_message());
            exit_code
        }
    }
}

fn install_logging(cli: &Cli) {
    let config = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: {err}");
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let connection_path = match cli.config_file {
        Some(path) => path,
        None => default_connection_path()?,
    };
    let saved = load_connection(&connection_path)?;
    let server_url = resolve_server_url(cli.server_url, saved.as_ref())?;
    let manager = AccountManager::new(server_url, client_options(cli.timeout))?;

    let mut ctx = AppContext {
        manager,
        prompt: Box::new(TerminalPrompt),
        console: Console::stdout(),
        output: cli.output,
        assume_yes: cli.yes,
    };

    match cli.command {
        Command::Login => handle_login(&mut ctx, cli.access_key, &connection_path).await,
        Command::Logout => {
            let access_key = stored_access_key(cli.access_key, saved)?;
            handle_logout(&mut ctx, &access_key, &connection_path).await
        }
        Command::Resource(command) => {
            let access_key = stored_access_key(cli.access_key, saved)?;
            ctx.manager.login_with_access_token(&access_key).await?;
            execute(&ctx, command).await
        }
    }
}

/// Run a command that needs an authenticated manager.
pub(crate) async fn execute(ctx: &AppContext, command: ResourceCommand) -> CliResult<()> {
    match command {
        ResourceCommand::Whoami => handle_whoami(ctx).await,
        ResourceCommand::AccessKey(command) => match command {
            AccessKeyCommand::Add(args) => handle_access_key_add(ctx, args).await,
            AccessKeyCommand::List => handle_access_key_list(ctx).await,
            AccessKeyCommand::Remove(args) => handle_access_key_remove(ctx, args).await,
        },
        ResourceCommand::App(command) => match command {
            AppCommand::Add(args) => handle_app_add(ctx, args).await,
            AppCommand::List => handle_app_list(ctx).await,
            AppCommand::Remove(args) => handle_app_remove(ctx, args).await,
            AppCommand::Rename(args) => handle_app_rename(ctx, args).await,
        },
        ResourceCommand::Deployment(command) => match command {
            DeploymentCommand::Add(args) => handle_deployment_add(ctx, args).await,
            DeploymentCommand::List(args) => handle_deployment_list(ctx, args).await,
            DeploymentCommand::Remove(args) => handle_deployment_remove(ctx, args).await,
            DeploymentCommand::Rename(args) => handle_deployment_rename(ctx, args).await,
        },
        ResourceCommand::DeploymentKey(command) => match command {
            DeploymentKeyCommand::Add(args) => handle_deployment_key_add(ctx, args).await,
            DeploymentKeyCommand::List(args) => handle_deployment_key_list(ctx, args).await,
            DeploymentKeyCommand::Remove(args) => handle_deployment_key_remove(ctx, args).await,
        },
        ResourceCommand::Release(args) => handle_release(ctx, args).await,
        ResourceCommand::Package(PackageCommand::Show(args)) => {
            handle_package_show(ctx, args).await
        }
    }
}

/// Requests run without a deadline unless `--timeout` asks for one.
fn client_options(timeout_secs: Option<u64>) -> ClientOptions {
    ClientOptions {
        user_agent: USER_AGENT.to_string(),
        credential_mode: CredentialMode::Session,
        timeout: timeout_secs.map(Duration::from_secs),
    }
}

fn resolve_server_url(flag: Option<Url>, saved: Option<&Connection>) -> CliResult<Url> {
    if let Some(url) = flag {
        return Ok(url);
    }
    let (raw, origin) = saved.map_or((DEFAULT_SERVER_URL, "default"), |connection| {
        (connection.server_url.as_str(), "connection file")
    });
    parse_url(raw).map_err(|err| CliError::validation(format!("{err} (from {origin})")))
}

fn stored_access_key(flag: Option<String>, saved: Option<Connection>) -> CliResult<String> {
    flag.or_else(|| saved.map(|connection| connection.access_key))
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            CliError::validation(
                "not logged in; run `codepush login --access-key <key>` or set CODEPUSH_ACCESS_KEY",
            )
        })
}

#[derive(Parser)]
#[command(
    name = "codepush",
    version,
    about = "Manage apps, deployments and releases on a release-management service"
)]
pub(crate) struct Cli {
    #[arg(long, global = true, env = "CODEPUSH_SERVER_URL", value_parser = parse_url)]
    server_url: Option<Url>,
    #[arg(long, global = true, env = "CODEPUSH_ACCESS_KEY", hide_env_values = true)]
    access_key: Option<String>,
    #[arg(
        long,
        global = true,
        env = "CODEPUSH_HTTP_TIMEOUT_SECS",
        help = "Abort a request after this many seconds (no limit by default)"
    )]
    timeout: Option<u64>,
    #[arg(long, global = true, env = "CODEPUSH_CONFIG_FILE")]
    config_file: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(
        short = 'y',
        long,
        global = true,
        help = "Skip the confirmation prompt of destructive commands"
    )]
    yes: bool,
    #[arg(long, global = true, env = "CODEPUSH_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(long, global = true, env = "CODEPUSH_LOG_FORMAT", value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Log in with an access key and save the connection.
    Login,
    /// End the session and delete the saved connection.
    Logout,
    #[command(flatten)]
    Resource(ResourceCommand),
}

#[derive(Subcommand)]
pub(crate) enum ResourceCommand {
    /// Show the account behind the current access key.
    Whoami,
    /// Manage the account's access keys.
    #[command(subcommand)]
    AccessKey(AccessKeyCommand),
    /// Manage apps.
    #[command(subcommand)]
    App(AppCommand),
    /// Manage an app's deployments.
    #[command(subcommand)]
    Deployment(DeploymentCommand),
    /// Manage the keys release clients use to reach a deployment.
    #[command(subcommand)]
    DeploymentKey(DeploymentKeyCommand),
    /// Upload a package to a deployment.
    Release(ReleaseArgs),
    /// Inspect released packages.
    #[command(subcommand)]
    Package(PackageCommand),
}

#[derive(Subcommand)]
pub(crate) enum AccessKeyCommand {
    Add(AccessKeyAddArgs),
    List,
    Remove(AccessKeyRemoveArgs),
}

#[derive(Subcommand)]
pub(crate) enum AppCommand {
    Add(AppAddArgs),
    List,
    Remove(AppRemoveArgs),
    Rename(AppRenameArgs),
}

#[derive(Subcommand)]
pub(crate) enum DeploymentCommand {
    Add(DeploymentAddArgs),
    List(DeploymentListArgs),
    Remove(DeploymentRemoveArgs),
    Rename(DeploymentRenameArgs),
}

#[derive(Subcommand)]
pub(crate) enum DeploymentKeyCommand {
    Add(DeploymentKeyAddArgs),
    List(DeploymentRefArgs),
    Remove(DeploymentKeyRemoveArgs),
}

#[derive(Subcommand)]
pub(crate) enum PackageCommand {
    Show(DeploymentRefArgs),
}

#[derive(Args, Debug)]
pub(crate) struct AccessKeyAddArgs {
    pub(crate) description: String,
    #[arg(long, help = "Machine name recorded with the key (defaults to the host name)")]
    pub(crate) created_by: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct AccessKeyRemoveArgs {
    pub(crate) name: String,
}

#[derive(Args, Debug)]
pub(crate) struct AppAddArgs {
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) description: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct AppRemoveArgs {
    pub(crate) name: String,
}

#[derive(Args, Debug)]
pub(crate) struct AppRenameArgs {
    pub(crate) current: String,
    #[arg(value_name = "NEW")]
    pub(crate) new_name: String,
}

#[derive(Args, Debug)]
pub(crate) struct DeploymentAddArgs {
    pub(crate) app: String,
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) description: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DeploymentListArgs {
    pub(crate) app: String,
}

#[derive(Args, Debug)]
pub(crate) struct DeploymentRemoveArgs {
    pub(crate) app: String,
    pub(crate) name: String,
}

#[derive(Args, Debug)]
pub(crate) struct DeploymentRenameArgs {
    pub(crate) app: String,
    pub(crate) current: String,
    #[arg(value_name = "NEW")]
    pub(crate) new_name: String,
}

#[derive(Args, Debug)]
pub(crate) struct DeploymentRefArgs {
    pub(crate) app: String,
    pub(crate) deployment: String,
}

#[derive(Args, Debug)]
pub(crate) struct DeploymentKeyAddArgs {
    pub(crate) app: String,
    pub(crate) deployment: String,
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) description: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DeploymentKeyRemoveArgs {
    pub(crate) app: String,
    pub(crate) deployment: String,
    pub(crate) name: String,
}

#[derive(Args, Debug)]
pub(crate) struct ReleaseArgs {
    pub(crate) app: String,
    pub(crate) deployment: String,
    #[arg(help = "Path of the package archive to upload")]
    pub(crate) package: PathBuf,
    #[arg(long, help = "Binary version of the app this release targets")]
    pub(crate) app_version: String,
    #[arg(long)]
    pub(crate) description: Option<String>,
    #[arg(long)]
    pub(crate) label: Option<String>,
    #[arg(long, help = "Require clients to install this release")]
    pub(crate) mandatory: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login => "login",
        Command::Logout => "logout",
        Command::Resource(resource) => match resource {
            ResourceCommand::Whoami => "whoami",
            ResourceCommand::AccessKey(AccessKeyCommand::Add(_)) => "access_key_add",
            ResourceCommand::AccessKey(AccessKeyCommand::List) => "access_key_list",
            ResourceCommand::AccessKey(AccessKeyCommand::Remove(_)) => "access_key_remove",
            ResourceCommand::App(AppCommand::Add(_)) => "app_add",
            ResourceCommand::App(AppCommand::List) => "app_list",
            ResourceCommand::App(AppCommand::Remove(_)) => "app_remove",
            ResourceCommand::App(AppCommand::Rename(_)) => "app_rename",
            ResourceCommand::Deployment(DeploymentCommand::Add(_)) => "deployment_add",
            ResourceCommand::Deployment(DeploymentCommand::List(_)) => "deployment_list",
            ResourceCommand::Deployment(DeploymentCommand::Remove(_)) => "deployment_remove",
            ResourceCommand::Deployment(DeploymentCommand::Rename(_)) => "deployment_rename",
            ResourceCommand::DeploymentKey(DeploymentKeyCommand::Add(_)) => "deployment_key_add",
            ResourceCommand::DeploymentKey(DeploymentKeyCommand::List(_)) => {
                "deployment_key_list"
            }
            ResourceCommand::DeploymentKey(DeploymentKeyCommand::Remove(_)) => {
                "deployment_key_remove"
            }
            ResourceCommand::Release(_) => "release",
            ResourceCommand::Package(PackageCommand::Show(_)) => "package_show",
        },
    }
}

fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input.parse::<LogFormat>().map_err(|err| err.to_string())
}
