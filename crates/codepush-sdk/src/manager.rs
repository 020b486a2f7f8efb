//! `AccountManager`: one method per management REST operation.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use codepush_api_models::{
    AccessKey, AccessKeyEnvelope, AccessKeyList, Account, AccountEnvelope, App, AppEnvelope,
    AppList, Deployment, DeploymentEnvelope, DeploymentKey, DeploymentKeyEnvelope,
    DeploymentKeyList, DeploymentList, Package, PackageEnvelope, PackageInfo,
};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ManagementError, ManagementResult};
use crate::files::{FileAccess, LocalFileAccess, PackageBlob, PackageSource};
use crate::response::{Completed, interpret};
use crate::session::{ClientOptions, CredentialMode, Session, sets_cookies};
use crate::token::AccessToken;

const ACCESS_KEYS: &str = "accessKeys";
const APPS: &str = "apps";
const DEPLOYMENTS: &str = "deployments";
const DEPLOYMENT_KEYS: &str = "deploymentKeys";

/// Management client for a single service endpoint.
///
/// Holds the optional authenticated [`Session`]; login and authentication
/// checks replace it, logout clears it.
pub struct AccountManager {
    server_url: Url,
    options: ClientOptions,
    base_client: Client,
    session: Option<Session>,
    files: Arc<dyn FileAccess>,
}

impl std::fmt::Debug for AccountManager {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AccountManager")
            .field("server_url", &self.server_url.as_str())
            .field("credential_mode", &self.options.credential_mode)
            .field("has_session", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl AccountManager {
    /// Create a manager for `server_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL cannot carry path segments or the HTTP
    /// client cannot be built from `options`.
    pub fn new(server_url: Url, options: ClientOptions) -> ManagementResult<Self> {
        if server_url.cannot_be_a_base() {
            return Err(ManagementError::InvalidServerUrl {
                url: server_url.to_string(),
            });
        }
        let base_client = options.base_client()?;
        Ok(Self {
            server_url,
            options,
            base_client,
            session: None,
            files: Arc::new(LocalFileAccess),
        })
    }

    /// Replace the capability used to open package paths.
    #[must_use]
    pub fn with_file_access(mut self, files: Arc<dyn FileAccess>) -> Self {
        self.files = files;
        self
    }

    /// Service root all routes are resolved against.
    #[must_use]
    pub const fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Credential attachment policy in effect.
    #[must_use]
    pub const fn credential_mode(&self) -> CredentialMode {
        self.options.credential_mode
    }

    /// Current authenticated session, if one has been established.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Log in with an encoded access token.
    ///
    /// The token is decoded before any request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::InvalidAccessToken`] for an undecodable token,
    /// or the request failure otherwise.
    pub async fn login_with_access_token(&mut self, access_token: &str) -> ManagementResult<()> {
        let token = AccessToken::decode(access_token)?;
        let identity = token.identity_json()?;
        let url = self.endpoint(&["auth", "login", "accessToken"])?;

        let request = self.client().post(url).form(&[
            ("identity", identity.as_str()),
            ("token", token.access_key_name.as_str()),
        ]);
        let completed = self
            .dispatch(request, &Method::POST, "/auth/login/accessToken")
            .await?;

        if self.options.credential_mode == CredentialMode::Session {
            self.session = Some(Session::from_headers(
                &self.server_url,
                &completed.headers,
                &self.options,
            )?);
        }
        info!(provider = %token.provider_name, "logged in with access token");
        Ok(())
    }

    /// End the remote session and drop the local one.
    ///
    /// # Errors
    ///
    /// Returns the request failure; the local session is kept in that case.
    pub async fn logout(&mut self) -> ManagementResult<()> {
        let url = self.endpoint(&["auth", "logout"])?;
        let request = self.client().post(url);
        self.dispatch(request, &Method::POST, "/auth/logout").await?;
        self.session = None;
        info!("logged out");
        Ok(())
    }

    /// Check whether the current credentials are accepted.
    ///
    /// `200` means authenticated, `401` means not; any other status is an error.
    /// A successful check that sets cookies replaces the session.
    ///
    /// # Errors
    ///
    /// Returns transport failures and unexpected statuses.
    pub async fn is_authenticated(&mut self) -> ManagementResult<bool> {
        let url = self.endpoint(&["authenticated"])?;
        debug!(method = %Method::GET, route = "/authenticated", "dispatching management request");
        let response = self
            .client()
            .get(url)
            .send()
            .await
            .map_err(ManagementError::transport)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        let completed = interpret(response).await?;
        let authenticated = completed.status == StatusCode::OK;
        if authenticated
            && self.options.credential_mode == CredentialMode::Session
            && sets_cookies(&completed.headers)
        {
            self.session = Some(Session::from_headers(
                &self.server_url,
                &completed.headers,
                &self.options,
            )?);
        }
        Ok(authenticated)
    }

    /// Generate and register a new access key for `machine`.
    ///
    /// Returns `None` when the service does not report the new key's location.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn add_access_key(
        &self,
        machine: &str,
        description: Option<&str>,
    ) -> ManagementResult<Option<AccessKey>> {
        let mut access_key = AccessKey {
            id: String::new(),
            name: Uuid::new_v4().simple().to_string(),
            description: description.map(str::to_string),
            created_by: Some(machine.to_string()),
            created_time: Some(Utc::now().timestamp_millis()),
        };
        let completed = self
            .send_json(Method::POST, &[ACCESS_KEYS], &access_key)
            .await?;
        Ok(completed.created_id().map(|id| {
            access_key.id = id;
            access_key
        }))
    }

    /// Fetch one access key.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_access_key(&self, access_key_id: &str) -> ManagementResult<Option<AccessKey>> {
        let envelope: Option<AccessKeyEnvelope> =
            self.get_json(&[ACCESS_KEYS, access_key_id]).await?;
        Ok(envelope.map(|envelope| envelope.access_key))
    }

    /// List the account's access keys in service order.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_access_keys(&self) -> ManagementResult<Vec<AccessKey>> {
        let list: Option<AccessKeyList> = self.get_json(&[ACCESS_KEYS]).await?;
        Ok(list.map(|list| list.access_keys).unwrap_or_default())
    }

    /// Delete an access key.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn remove_access_key(&self, access_key_id: &str) -> ManagementResult<()> {
        self.delete(&[ACCESS_KEYS, access_key_id]).await
    }

    /// Fetch the authenticated account.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_account_info(&self) -> ManagementResult<Option<Account>> {
        let envelope: Option<AccountEnvelope> = self.get_json(&["account"]).await?;
        Ok(envelope.map(|envelope| envelope.account))
    }

    /// Update the authenticated account.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn update_account_info(&self, account: &Account) -> ManagementResult<()> {
        self.send_json(Method::PUT, &["account"], account).await?;
        Ok(())
    }

    /// List apps in service order.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_apps(&self) -> ManagementResult<Vec<App>> {
        let list: Option<AppList> = self.get_json(&[APPS]).await?;
        Ok(list.map(|list| list.apps).unwrap_or_default())
    }

    /// Fetch one app.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_app(&self, app_id: &str) -> ManagementResult<Option<App>> {
        let envelope: Option<AppEnvelope> = self.get_json(&[APPS, app_id]).await?;
        Ok(envelope.map(|envelope| envelope.app))
    }

    /// Register a new app.
    ///
    /// Returns `None` when the service does not report the new app's location.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn add_app(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> ManagementResult<Option<App>> {
        let mut app = App {
            id: String::new(),
            name: name.to_string(),
            description: description.map(str::to_string),
        };
        let completed = self.send_json(Method::POST, &[APPS], &app).await?;
        Ok(completed.created_id().map(|id| {
            app.id = id;
            app
        }))
    }

    /// Replace an app's mutable fields; `app.id` selects the target.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn update_app(&self, app: &App) -> ManagementResult<()> {
        self.send_json(Method::PUT, &[APPS, app.id.as_str()], app).await?;
        Ok(())
    }

    /// Delete an app.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn remove_app(&self, app_id: &str) -> ManagementResult<()> {
        self.delete(&[APPS, app_id]).await
    }

    /// List an app's deployments in service order.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_deployments(&self, app_id: &str) -> ManagementResult<Vec<Deployment>> {
        let list: Option<DeploymentList> = self.get_json(&[APPS, app_id, DEPLOYMENTS]).await?;
        Ok(list.map(|list| list.deployments).unwrap_or_default())
    }

    /// Fetch one deployment.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_deployment(
        &self,
        app_id: &str,
        deployment_id: &str,
    ) -> ManagementResult<Option<Deployment>> {
        let envelope: Option<DeploymentEnvelope> = self
            .get_json(&[APPS, app_id, DEPLOYMENTS, deployment_id])
            .await?;
        Ok(envelope.map(|envelope| envelope.deployment))
    }

    /// Create a deployment under an app.
    ///
    /// Returns `None` when the service does not report the new deployment's location.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn add_deployment(
        &self,
        app_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> ManagementResult<Option<Deployment>> {
        let mut deployment = Deployment {
            id: String::new(),
            name: name.to_string(),
            description: description.map(str::to_string),
            package: None,
        };
        let completed = self
            .send_json(Method::POST, &[APPS, app_id, DEPLOYMENTS], &deployment)
            .await?;
        Ok(completed.created_id().map(|id| {
            deployment.id = id;
            deployment
        }))
    }

    /// Replace a deployment's mutable fields; `deployment.id` selects the target.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn update_deployment(
        &self,
        app_id: &str,
        deployment: &Deployment,
    ) -> ManagementResult<()> {
        self.send_json(
            Method::PUT,
            &[APPS, app_id, DEPLOYMENTS, deployment.id.as_str()],
            deployment,
        )
        .await?;
        Ok(())
    }

    /// Delete a deployment.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn remove_deployment(&self, app_id: &str, deployment_id: &str) -> ManagementResult<()> {
        self.delete(&[APPS, app_id, DEPLOYMENTS, deployment_id])
            .await
    }

    /// List a deployment's keys in service order.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_deployment_keys(
        &self,
        app_id: &str,
        deployment_id: &str,
    ) -> ManagementResult<Vec<DeploymentKey>> {
        let list: Option<DeploymentKeyList> = self
            .get_json(&[APPS, app_id, DEPLOYMENTS, deployment_id, DEPLOYMENT_KEYS])
            .await?;
        Ok(list.map(|list| list.deployment_keys).unwrap_or_default())
    }

    /// Fetch one deployment key.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_deployment_key(
        &self,
        app_id: &str,
        deployment_id: &str,
        deployment_key_id: &str,
    ) -> ManagementResult<Option<DeploymentKey>> {
        let envelope: Option<DeploymentKeyEnvelope> = self
            .get_json(&[
                APPS,
                app_id,
                DEPLOYMENTS,
                deployment_id,
                DEPLOYMENT_KEYS,
                deployment_key_id,
            ])
            .await?;
        Ok(envelope.map(|envelope| envelope.deployment_key))
    }

    /// Create a non-primary deployment key.
    ///
    /// Returns `None` when the service does not report the new key's location.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn add_deployment_key(
        &self,
        app_id: &str,
        deployment_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> ManagementResult<Option<DeploymentKey>> {
        let mut deployment_key = DeploymentKey {
            id: String::new(),
            name: name.to_string(),
            description: description.map(str::to_string),
            is_primary: false,
            key: None,
        };
        let completed = self
            .send_json(
                Method::POST,
                &[APPS, app_id, DEPLOYMENTS, deployment_id, DEPLOYMENT_KEYS],
                &deployment_key,
            )
            .await?;
        Ok(completed.created_id().map(|id| {
            deployment_key.id = id;
            deployment_key
        }))
    }

    /// Replace a deployment key's mutable fields; `deployment_key.id` selects the target.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn update_deployment_key(
        &self,
        app_id: &str,
        deployment_id: &str,
        deployment_key: &DeploymentKey,
    ) -> ManagementResult<()> {
        self.send_json(
            Method::PUT,
            &[
                APPS,
                app_id,
                DEPLOYMENTS,
                deployment_id,
                DEPLOYMENT_KEYS,
                deployment_key.id.as_str(),
            ],
            deployment_key,
        )
        .await?;
        Ok(())
    }

    /// Delete a deployment key.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn remove_deployment_key(
        &self,
        app_id: &str,
        deployment_id: &str,
        deployment_key_id: &str,
    ) -> ManagementResult<()> {
        self.delete(&[
            APPS,
            app_id,
            DEPLOYMENTS,
            deployment_id,
            DEPLOYMENT_KEYS,
            deployment_key_id,
        ])
        .await
    }

    /// Fetch the deployment's current package.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_package(
        &self,
        app_id: &str,
        deployment_id: &str,
    ) -> ManagementResult<Option<Package>> {
        let envelope: Option<PackageEnvelope> = self
            .get_json(&[APPS, app_id, DEPLOYMENTS, deployment_id, "package"])
            .await?;
        Ok(envelope.map(|envelope| envelope.package))
    }

    /// Open a package path through the configured [`FileAccess`].
    ///
    /// # Errors
    ///
    /// Returns the file access failure, typically [`ManagementError::Io`].
    pub async fn open_package(&self, path: &Path) -> ManagementResult<PackageBlob> {
        self.files.open(path).await
    }

    /// Upload a new package for a deployment.
    ///
    /// Paths are opened through the configured [`FileAccess`]; blob handles are
    /// streamed as given.
    ///
    /// # Errors
    ///
    /// Returns file access, encoding, or request failures.
    pub async fn add_package(
        &self,
        app_id: &str,
        deployment_id: &str,
        source: PackageSource,
        info: &PackageInfo,
    ) -> ManagementResult<()> {
        let blob = match source {
            PackageSource::Path(path) => self.open_package(&path).await?,
            PackageSource::Blob(blob) => blob,
        };
        let package_info =
            serde_json::to_string(info).map_err(|source| ManagementError::Encode { source })?;
        let form = Form::new()
            .part("package", blob.into_part())
            .text("packageInfo", package_info);

        let segments = [APPS, app_id, DEPLOYMENTS, deployment_id, "package"];
        let url = self.endpoint(&segments)?;
        let request = self.client().put(url).multipart(form);
        self.dispatch(request, &Method::PUT, &route(&segments))
            .await?;
        Ok(())
    }

    fn client(&self) -> &Client {
        self.session
            .as_ref()
            .map_or(&self.base_client, Session::client)
    }

    fn endpoint(&self, segments: &[&str]) -> ManagementResult<Url> {
        let mut url = self.server_url.clone();
        url.path_segments_mut()
            .map_err(|()| ManagementError::InvalidServerUrl {
                url: self.server_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn dispatch(
        &self,
        request: RequestBuilder,
        method: &Method,
        route: &str,
    ) -> ManagementResult<Completed> {
        debug!(method = %method, route, "dispatching management request");
        let response = request.send().await.map_err(ManagementError::transport)?;
        match interpret(response).await {
            Ok(completed) => Ok(completed),
            Err(err) => {
                debug!(
                    method = %method,
                    route,
                    status = ?err.status_code(),
                    error = %err,
                    "management request failed"
                );
                Err(err)
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ManagementResult<Option<T>> {
        let url = self.endpoint(segments)?;
        let request = self.client().get(url);
        self.dispatch(request, &Method::GET, &route(segments))
            .await?
            .json()
    }

    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> ManagementResult<Completed> {
        let url = self.endpoint(segments)?;
        let request = self.client().request(method.clone(), url).json(body);
        self.dispatch(request, &method, &route(segments)).await
    }

    async fn delete(&self, segments: &[&str]) -> ManagementResult<()> {
        let url = self.endpoint(segments)?;
        let request = self.client().delete(url);
        self.dispatch(request, &Method::DELETE, &route(segments))
            .await?;
        Ok(())
    }
}

fn route(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}
