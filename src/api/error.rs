//! Error types for the Lambda Cloud client.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::token_store::TokenStoreError;

/// Errors raised by [`LambdaApi`](super::LambdaApi) operations.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LambdaApiError {
    /// Raised when the endpoint cannot be used as a base URL.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when the provider answers with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the provider.
        body: String,
    },
    /// Raised when the request never produced a response.
    #[error("transport error: {message}")]
    Transport {
        /// Message returned by the HTTP client.
        message: String,
    },
    /// Raised when a success response does not match the expected shape.
    #[error("failed to decode response from {path}: {message}")]
    Decode {
        /// Request path relative to the endpoint.
        path: String,
        /// Parser error message.
        message: String,
    },
    /// Raised when a launch request is incomplete.
    #[error("invalid launch request: {0}")]
    Validation(String),
    /// Raised when an instance id cannot be used as a single path segment.
    #[error("invalid instance id {instance_id:?}")]
    InvalidInstanceId {
        /// Instance id as given by the caller.
        instance_id: String,
    },
    /// Raised when the requested instance type is not offered.
    #[error("instance type {instance_type} not found")]
    InstanceTypeNotFound {
        /// Requested instance type name.
        instance_type: String,
    },
    /// Raised when no region reports capacity for the requested type.
    #[error("no region has capacity for instance type {instance_type}")]
    NoRegionAvailable {
        /// Requested instance type name.
        instance_type: String,
    },
    /// Raised when a public key file cannot be read.
    #[error("failed to read public key {path}: {message}")]
    KeyFile {
        /// Path of the key file.
        path: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
    /// Raised when the token cannot be resolved.
    #[error(transparent)]
    Token(#[from] TokenStoreError),
}

impl From<reqwest::Error> for LambdaApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}

impl From<ConfigError> for LambdaApiError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
