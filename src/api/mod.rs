//! Async client for the Lambda Cloud REST API.
//!
//! Every operation performs one request (launch performs two: a listing to
//! pick the region, then the launch itself), fails on any non-success status,
//! and returns the decoded `data` payload. Requests carry
//! `Authorization: Bearer <token>` only when a token resolves.

mod error;
mod launch;
mod types;

use camino::Utf8Path;
use reqwest::{RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::{LambdaConfig, parse_endpoint};
use crate::env::{EnvSource, ProcessEnv};
use crate::files;
use crate::token_store::{Token, TokenResolver};

pub use error::LambdaApiError;
pub use launch::{LaunchSpec, LaunchSpecBuilder, OneOrMany, select_launch_region};
pub use types::{
    FileSystem, Instance, InstanceType, InstanceTypeSummary, Region, Specs, SshKey,
    TerminateResponse, filter_instance_types,
};

use types::{
    AddSshKeyPayload, Envelope, InstanceTypeListing, LaunchPayload, LaunchResponse,
    TerminatePayload,
};

const INSTANCE_TYPES_PATH: &str = "instance-types";
const INSTANCES_PATH: &str = "instances";
const LAUNCH_PATH: &str = "instance-operations/launch";
const TERMINATE_PATH: &str = "instance-operations/terminate";
const SSH_KEYS_PATH: &str = "ssh-keys";
const FILE_SYSTEMS_PATH: &str = "file-systems";

/// Client for the Lambda Cloud API.
#[derive(Clone, Debug)]
pub struct LambdaApi<E = ProcessEnv> {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<Token>,
    tokens: TokenResolver<E>,
}

impl LambdaApi<ProcessEnv> {
    /// Builds a client from loaded configuration, resolving tokens from the
    /// process environment and the default token file.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError::Config`] for an unusable endpoint and
    /// [`LambdaApiError::Token`] when no token location can be derived.
    pub fn from_config(config: &LambdaConfig) -> Result<Self, LambdaApiError> {
        let tokens = TokenResolver::from_process_env()?;
        Self::new(Some(&config.endpoint), None, tokens)
    }
}

impl<E: EnvSource> LambdaApi<E> {
    /// Creates a client for `endpoint` (the production URL when `None`) with
    /// an optional default token.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError::Config`] when the endpoint is not an HTTP(S)
    /// URL.
    pub fn new(
        endpoint: Option<&str>,
        token: Option<Token>,
        tokens: TokenResolver<E>,
    ) -> Result<Self, LambdaApiError> {
        let endpoint = parse_endpoint(endpoint.unwrap_or(crate::config::DEFAULT_ENDPOINT))?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            token,
            tokens,
        })
    }

    /// Replaces the default token used when a call resolves credentials.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Base URL that request paths are joined onto.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Lists instance types in provider order. Unless `show_all` is set, only
    /// types with at least one region reporting capacity are returned.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError`] when the request fails or the response
    /// cannot be decoded.
    pub async fn list_instance_types(
        &self,
        show_all: bool,
    ) -> Result<Vec<InstanceType>, LambdaApiError> {
        let InstanceTypeListing(types) = self.get(INSTANCE_TYPES_PATH).await?;
        Ok(filter_instance_types(types, show_all))
    }

    /// Launches instances and returns their identifiers.
    ///
    /// The instance types are listed first so an unknown type, or a type
    /// without capacity in any region, fails before the launch request is
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError::InstanceTypeNotFound`] or
    /// [`LambdaApiError::NoRegionAvailable`] from local validation, and other
    /// [`LambdaApiError`] variants when either request fails.
    pub async fn create_instance(&self, spec: &LaunchSpec) -> Result<Vec<String>, LambdaApiError> {
        let types = self.list_instance_types(true).await?;
        let region = select_launch_region(&types, spec)?;
        if spec.region.is_none() {
            info!(
                instance_type = %spec.instance_type,
                region = %region,
                "no region requested; using first region with capacity"
            );
        }

        let payload = LaunchPayload {
            region_name: &region,
            instance_type_name: &spec.instance_type,
            ssh_key_names: &spec.ssh_key_names,
            file_system_names: &spec.file_system_names,
            quantity: spec.quantity,
        };
        debug!(?payload, "launch payload");
        let LaunchResponse { instance_ids } = self.post(LAUNCH_PATH, &payload).await?;
        info!(?instance_ids, region = %region, "launched instances");
        Ok(instance_ids)
    }

    /// Lists all instances on the account.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError`] when the request fails or the response
    /// cannot be decoded.
    pub async fn list_instances(&self) -> Result<Vec<Instance>, LambdaApiError> {
        self.get(INSTANCES_PATH).await
    }

    /// Fetches one instance by id. The id is sent as a single encoded path
    /// segment.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError::InvalidInstanceId`] for a blank id or a dot
    /// segment, and other [`LambdaApiError`] variants when the request fails
    /// or the response cannot be decoded.
    pub async fn get_instance(&self, instance_id: &str) -> Result<Instance, LambdaApiError> {
        let url = self.instance_url(instance_id)?;
        self.get_url(INSTANCES_PATH, url).await
    }

    /// Requests termination of a single instance.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError`] when the request fails or the response
    /// cannot be decoded.
    pub async fn delete_instance(
        &self,
        instance_id: &str,
    ) -> Result<TerminateResponse, LambdaApiError> {
        let payload = TerminatePayload {
            instance_ids: [instance_id],
        };
        let response: TerminateResponse = self.post(TERMINATE_PATH, &payload).await?;
        info!(instance_id, "requested termination");
        Ok(response)
    }

    /// Lists the SSH keys registered with the account.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError`] when the request fails or the response
    /// cannot be decoded.
    pub async fn list_ssh_keys(&self) -> Result<Vec<SshKey>, LambdaApiError> {
        self.get(SSH_KEYS_PATH).await
    }

    /// Registers `public_key` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError`] when the request fails or the response
    /// cannot be decoded.
    pub async fn add_ssh_key(&self, name: &str, public_key: &str) -> Result<SshKey, LambdaApiError> {
        let payload = AddSshKeyPayload { name, public_key };
        self.post(SSH_KEYS_PATH, &payload).await
    }

    /// Registers the contents of the file at `path` as a public key.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError::KeyFile`] when the file cannot be read,
    /// before any request is sent.
    pub async fn add_ssh_key_from_file(
        &self,
        name: &str,
        path: &Utf8Path,
    ) -> Result<SshKey, LambdaApiError> {
        let public_key = files::read_to_string(path).map_err(|err| LambdaApiError::KeyFile {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        self.add_ssh_key(name, &public_key).await
    }

    /// Lists persistent file systems.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError`] when the request fails or the response
    /// cannot be decoded.
    pub async fn list_file_systems(&self) -> Result<Vec<FileSystem>, LambdaApiError> {
        self.get(FILE_SYSTEMS_PATH).await
    }

    fn url(&self, path: &str) -> Result<Url, LambdaApiError> {
        self.endpoint
            .join(path)
            .map_err(|err| LambdaApiError::Config(format!("invalid request path {path}: {err}")))
    }

    fn instance_url(&self, instance_id: &str) -> Result<Url, LambdaApiError> {
        if matches!(instance_id.trim(), "" | "." | "..") {
            return Err(LambdaApiError::InvalidInstanceId {
                instance_id: instance_id.to_owned(),
            });
        }
        let mut url = self.url(INSTANCES_PATH)?;
        url.path_segments_mut()
            .map_err(|()| {
                LambdaApiError::Config(format!("endpoint {} cannot take a path", self.endpoint))
            })?
            .push(instance_id);
        Ok(url)
    }

    fn authorise(&self, request: RequestBuilder) -> Result<RequestBuilder, LambdaApiError> {
        Ok(match self.tokens.resolve(self.token.as_ref())? {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, LambdaApiError> {
        let url = self.url(path)?;
        self.get_url(path, url).await
    }

    async fn get_url<T: DeserializeOwned>(&self, path: &str, url: Url) -> Result<T, LambdaApiError> {
        debug!(method = "GET", %url, "sending request");
        let request = self.authorise(self.http.get(url))?;
        let response = request.send().await?;
        Self::read_data(path, response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, LambdaApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!(method = "POST", %url, "sending request");
        let request = self.authorise(self.http.post(url).json(body))?;
        let response = request.send().await?;
        Self::read_data(path, response).await
    }

    async fn read_data<T: DeserializeOwned>(
        path: &str,
        response: Response,
    ) -> Result<T, LambdaApiError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), path, "request rejected");
            return Err(LambdaApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<Envelope<T>>(&body)
            .map(|envelope| envelope.data)
            .map_err(|err| LambdaApiError::Decode {
                path: path.to_owned(),
                message: err.to_string(),
            })
    }
}
