#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the release-management API.
//!
//! Records mirror the service's camelCase JSON. Every record is owned by the
//! remote service; the client only holds request-scoped copies. Envelope types
//! wrap the records the way the service nests them (`{"apps": [...]}`,
//! `{"app": {...}}`) so the SDK can decode bodies without ad-hoc `Value` walks.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Identity of the authenticated principal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Server-assigned account identifier.
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Login name of the account.
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Display name.
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Contact e-mail address.
    pub email: Option<String>,
}

/// Long-lived credential substituting for interactive login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccessKey {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    /// Server-assigned identifier (empty before creation).
    pub id: String,
    /// Secret token value of the key.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Free-form description supplied at creation.
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Machine that generated the key.
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Creation time in epoch milliseconds.
    pub created_time: Option<i64>,
}

impl AccessKey {
    /// Creation time as a UTC timestamp, when recorded and representable.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_time.and_then(millis_to_utc)
    }
}

/// Application registered with the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct App {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    /// Server-assigned identifier (empty before creation).
    pub id: String,
    /// Human-readable application name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional description.
    pub description: Option<String>,
}

/// Release channel belonging to exactly one app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    /// Server-assigned identifier (empty before creation).
    pub id: String,
    /// Human-readable deployment name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional description.
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Latest released package, if any.
    pub package: Option<Package>,
}

/// Opaque token identifying a deployment to release-consuming clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentKey {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    /// Server-assigned identifier (empty before creation).
    pub id: String,
    /// Human-readable key name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional description.
    pub description: Option<String>,
    #[serde(default)]
    /// Whether this is the deployment's primary key.
    pub is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Token value release clients embed, when the service returns it.
    pub key: Option<String>,
}

/// Metadata describing one uploaded release payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Service-assigned release label (e.g. `v3`).
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Release notes.
    pub description: Option<String>,
    #[serde(default)]
    /// Binary version of the app this package targets.
    pub app_version: String,
    #[serde(default)]
    /// Whether clients must install this release.
    pub is_mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Content hash computed by the service.
    pub package_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Blob size in bytes.
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Download location of the blob.
    pub blob_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Upload time in epoch milliseconds.
    pub upload_time: Option<i64>,
}

impl Package {
    /// Upload time as a UTC timestamp, when recorded and representable.
    #[must_use]
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        self.upload_time.and_then(millis_to_utc)
    }
}

/// Metadata sent in the `packageInfo` field of an upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Release notes.
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Requested release label.
    pub label: Option<String>,
    /// Binary version of the app this package targets.
    pub app_version: String,
    #[serde(default)]
    /// Whether clients must install this release.
    pub is_mandatory: bool,
}

/// `{"account": {...}}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountEnvelope {
    /// Wrapped account.
    pub account: Account,
}

/// `{"accessKey": {...}}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyEnvelope {
    /// Wrapped access key.
    pub access_key: AccessKey,
}

/// `{"accessKeys": [...]}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyList {
    /// Access keys in service order.
    pub access_keys: Vec<AccessKey>,
}

/// `{"app": {...}}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppEnvelope {
    /// Wrapped app.
    pub app: App,
}

/// `{"apps": [...]}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppList {
    /// Apps in service order.
    pub apps: Vec<App>,
}

/// `{"deployment": {...}}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentEnvelope {
    /// Wrapped deployment.
    pub deployment: Deployment,
}

/// `{"deployments": [...]}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DeploymentList {
    /// Deployments in service order.
    pub deployments: Vec<Deployment>,
}

/// `{"deploymentKey": {...}}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentKeyEnvelope {
    /// Wrapped deployment key.
    pub deployment_key: DeploymentKey,
}

/// `{"deploymentKeys": [...]}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentKeyList {
    /// Deployment keys in service order.
    pub deployment_keys: Vec<DeploymentKey>,
}

/// `{"package": {...}}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageEnvelope {
    /// Wrapped package.
    pub package: Package,
}

fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}
