//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

/// Production base URL of the Lambda Cloud API.
pub const DEFAULT_ENDPOINT: &str = "https://cloud.lambdalabs.com/api/v1/";

/// Client settings derived from defaults, configuration files, and
/// environment variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "LAMBDACLOUD",
    discovery(
        app_name = "lambdacloud",
        env_var = "LAMBDACLOUD_CONFIG_PATH",
        config_file_name = "lambdacloud.toml",
        dotfile_name = ".lambdacloud.toml",
        project_file_name = "lambdacloud.toml"
    )
)]
pub struct LambdaConfig {
    /// Base URL every request path is joined onto.
    #[ortho_config(default = DEFAULT_ENDPOINT.to_owned())]
    pub endpoint: String,
}

impl LambdaConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("lambdacloud")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Checks that the endpoint is present and parses as an HTTP(S) URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] for a blank endpoint and
    /// [`ConfigError::InvalidEndpoint`] for anything that is not a URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url().map(drop)
    }

    /// Returns the endpoint as a URL ending in `/`, ready for joining
    /// relative request paths.
    ///
    /// # Errors
    ///
    /// See [`Self::validate`].
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        parse_endpoint(&self.endpoint)
    }
}

/// Parses `raw` into a base URL, appending the trailing slash that
/// [`Url::join`] needs to keep the last path segment.
///
/// # Errors
///
/// Returns [`ConfigError`] when `raw` is blank, unparsable, or not HTTP(S).
pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingField(String::from(
            "missing API endpoint: set LAMBDACLOUD_ENDPOINT or add endpoint to lambdacloud.toml",
        )));
    }

    let normalised = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&normalised).map_err(|err| ConfigError::InvalidEndpoint {
        endpoint: trimmed.to_owned(),
        message: err.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEndpoint {
            endpoint: trimmed.to_owned(),
            message: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

/// Errors raised during configuration loading and validation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates the endpoint is not a usable base URL.
    #[error("invalid endpoint {endpoint}: {message}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Parser error message.
        message: String,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
