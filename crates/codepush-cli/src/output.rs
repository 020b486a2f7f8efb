//! Output renderers and the console sink used by command handlers.

use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use codepush_api_models::{AccessKey, Account, App, Deployment, DeploymentKey, Package};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Line-oriented sink for user-facing output.
pub(crate) struct Console {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Console {
    pub(crate) fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub(crate) fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(writer)),
        }
    }

    pub(crate) fn line(&self, text: impl AsRef<str>) -> CliResult<()> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| CliError::failure(anyhow!("output stream lock poisoned")))?;
        writeln!(sink, "{}", text.as_ref())
            .and_then(|()| sink.flush())
            .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
    }
}

pub(crate) fn render_apps(console: &Console, apps: &[App], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(console, apps),
        OutputFormat::Table => {
            console.line(format!("{:<24} {:<36} DESCRIPTION", "NAME", "ID"))?;
            for app in apps {
                console.line(format!(
                    "{:<24} {:<36} {}",
                    app.name,
                    app.id,
                    app.description.as_deref().unwrap_or("")
                ))?;
            }
            Ok(())
        }
    }
}

pub(crate) fn render_deployments(
    console: &Console,
    deployments: &[Deployment],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(console, deployments),
        OutputFormat::Table => {
            console.line(format!(
                "{:<20} {:<36} {:<8} {:<12} UPLOADED",
                "NAME", "ID", "LABEL", "APP VERSION"
            ))?;
            for deployment in deployments {
                let package = deployment.package.as_ref();
                console.line(format!(
                    "{:<20} {:<36} {:<8} {:<12} {}",
                    deployment.name,
                    deployment.id,
                    package.and_then(|p| p.label.as_deref()).unwrap_or("-"),
                    package.map_or("-", |p| p.app_version.as_str()),
                    package
                        .and_then(Package::uploaded_at)
                        .map_or_else(|| "-".to_string(), format_time)
                ))?;
            }
            Ok(())
        }
    }
}

pub(crate) fn render_deployment_keys(
    console: &Console,
    keys: &[DeploymentKey],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(console, keys),
        OutputFormat::Table => {
            console.line(format!("{:<20} {:<8} KEY", "NAME", "PRIMARY"))?;
            for key in keys {
                console.line(format!(
                    "{:<20} {:<8} {}",
                    key.name,
                    if key.is_primary { "yes" } else { "no" },
                    key.key.as_deref().unwrap_or("-")
                ))?;
            }
            Ok(())
        }
    }
}

pub(crate) fn render_access_keys(
    console: &Console,
    keys: &[AccessKey],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(console, keys),
        OutputFormat::Table => {
            console.line(format!(
                "{:<32} {:<20} {:<20} DESCRIPTION",
                "KEY", "CREATED BY", "CREATED"
            ))?;
            for key in keys {
                console.line(format!(
                    "{:<32} {:<20} {:<20} {}",
                    key.name,
                    key.created_by.as_deref().unwrap_or("-"),
                    key.created_at().map_or_else(|| "-".to_string(), format_time),
                    key.description.as_deref().unwrap_or("")
                ))?;
            }
            Ok(())
        }
    }
}

pub(crate) fn render_package(
    console: &Console,
    package: &Package,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(console, package),
        OutputFormat::Table => {
            if let Some(label) = &package.label {
                console.line(format!("label: {label}"))?;
            }
            console.line(format!("app version: {}", package.app_version))?;
            console.line(format!("mandatory: {}", package.is_mandatory))?;
            if let Some(description) = &package.description {
                console.line(format!("description: {description}"))?;
            }
            if let Some(size) = package.size {
                console.line(format!("size: {}", format_size(size)))?;
            }
            if let Some(hash) = &package.package_hash {
                console.line(format!("hash: {hash}"))?;
            }
            if let Some(uploaded) = package.uploaded_at() {
                console.line(format!("uploaded: {}", format_time(uploaded)))?;
            }
            if let Some(url) = &package.blob_url {
                console.line(format!("blob: {url}"))?;
            }
            Ok(())
        }
    }
}

pub(crate) fn render_account(
    console: &Console,
    account: &Account,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(console, account),
        OutputFormat::Table => {
            let shown = account
                .username
                .as_deref()
                .or(account.name.as_deref())
                .unwrap_or("<unknown>");
            let line = account.email.as_ref().map_or_else(
                || shown.to_string(),
                |email| format!("{shown} <{email}>"),
            );
            console.line(line)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(console: &Console, value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    console.line(text)
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

pub(crate) fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut whole = bytes;
    let mut unit = 0;
    while whole >= 1024 * 1024 && unit + 1 < UNITS.len() {
        whole /= 1024;
        unit += 1;
    }
    let tenths = whole * 10 / 1024;
    format!("{}.{} {}", tenths / 10, tenths % 10, UNITS[unit])
}

#[cfg(test)]
pub(crate) mod capture {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    /// Clonable in-memory writer for asserting on console output.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn contents(&self) -> String {
            self.0
                .lock()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut bytes = self
                .0
                .lock()
                .map_err(|_| io::Error::other("buffer lock poisoned"))?;
            bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::capture::SharedBuffer;
    use super::*;
    use serde_json::Value;

    fn console() -> (Console, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Console::from_writer(buffer.clone()), buffer)
    }

    #[test]
    fn format_size_scales_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }

    #[test]
    fn app_table_lists_rows_in_order() {
        let (console, buffer) = console();
        let apps = vec![
            App {
                id: "a1".into(),
                name: "Zeta".into(),
                description: None,
            },
            App {
                id: "a2".into(),
                name: "Alpha".into(),
                description: Some("mobile".into()),
            },
        ];
        render_apps(&console, &apps, OutputFormat::Table).expect("render");
        let text = buffer.contents();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME"));
        assert!(lines[1].starts_with("Zeta"));
        assert!(lines[2].starts_with("Alpha"));
        assert!(lines[2].ends_with("mobile"));
    }

    #[test]
    fn json_output_is_parseable() {
        let (console, buffer) = console();
        let keys = vec![DeploymentKey {
            id: "k1".into(),
            name: "Primary".into(),
            is_primary: true,
            key: Some("token".into()),
            description: None,
        }];
        render_deployment_keys(&console, &keys, OutputFormat::Json).expect("render");
        let parsed: Value = serde_json::from_str(&buffer.contents()).expect("json");
        assert_eq!(parsed[0]["isPrimary"], Value::Bool(true));
    }

    #[test]
    fn deployment_without_package_shows_placeholders() {
        let (console, buffer) = console();
        let deployments = vec![Deployment {
            id: "d1".into(),
            name: "Staging".into(),
            ..Deployment::default()
        }];
        render_deployments(&console, &deployments, OutputFormat::Table).expect("render");
        let text = buffer.contents();
        let row = text.lines().nth(1).expect("row");
        assert!(row.starts_with("Staging"));
        assert!(row.contains(" - "));
    }

    #[test]
    fn account_prefers_username_with_email() {
        let (console, buffer) = console();
        let account = Account {
            username: Some("dev".into()),
            email: Some("dev@example.com".into()),
            ..Account::default()
        };
        render_account(&console, &account, OutputFormat::Table).expect("render");
        assert_eq!(buffer.contents(), "dev <dev@example.com>\n");
    }
}
