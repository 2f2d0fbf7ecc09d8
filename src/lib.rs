//! Client library for the Lambda Cloud provisioning API.
//!
//! The crate wraps the REST endpoints for instance types, instance lifecycle,
//! SSH keys, and file systems in a typed async client, and persists the bearer
//! token used to authenticate those calls.

pub mod api;
pub mod config;
pub mod env;
mod files;
pub mod render;
pub mod token_store;

pub use api::{
    FileSystem, Instance, InstanceType, InstanceTypeSummary, LambdaApi, LambdaApiError,
    LaunchSpec, LaunchSpecBuilder, OneOrMany, Region, SshKey, TerminateResponse,
};
pub use config::{ConfigError, DEFAULT_ENDPOINT, LambdaConfig};
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use token_store::{Token, TokenResolver, TokenStore, TokenStoreError, login};
