//! Bearer token persistence and resolution.
//!
//! A single token is stored as raw text in `<cache root>/token`. The cache
//! root is `$LAMBDA_HOME`, then `$XDG_CACHE_HOME/lambda`, then
//! `$HOME/.cache/lambda`. At call time the effective token is chosen by
//! precedence: explicit value, then `LAMBDA_TOKEN`, then the stored file.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::env::{
    EnvSource, HOME_ENV, LAMBDA_HOME_ENV, LAMBDA_TOKEN_ENV, ProcessEnv, XDG_CACHE_HOME_ENV,
};
use crate::files;

const CACHE_DIR_NAME: &str = "lambda";
const TOKEN_FILE_NAME: &str = "token";

/// Opaque bearer credential. The `Debug` output never shows the secret.
#[derive(Clone, Eq, PartialEq)]
pub struct Token(String);

impl Token {
    /// Wraps a raw token string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Errors raised while locating or accessing the token file.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TokenStoreError {
    /// Raised when no variable identifies a cache directory.
    #[error("cannot locate the token cache: set LAMBDA_HOME, XDG_CACHE_HOME, or HOME")]
    NoCacheRoot,
    /// Raised when file system operations fail.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
}

/// Resolves the directory that holds the token file.
///
/// # Errors
///
/// Returns [`TokenStoreError::NoCacheRoot`] when `LAMBDA_HOME`,
/// `XDG_CACHE_HOME`, and `HOME` are all unset.
pub fn cache_home(env: &impl EnvSource) -> Result<Utf8PathBuf, TokenStoreError> {
    if let Some(home) = env.non_empty(LAMBDA_HOME_ENV) {
        return Ok(expand_home(&home, env));
    }
    if let Some(xdg) = env.non_empty(XDG_CACHE_HOME_ENV) {
        return Ok(expand_home(&xdg, env).join(CACHE_DIR_NAME));
    }
    env.non_empty(HOME_ENV)
        .map(|home| {
            Utf8PathBuf::from(home)
                .join(".cache")
                .join(CACHE_DIR_NAME)
        })
        .ok_or(TokenStoreError::NoCacheRoot)
}

fn expand_home(raw: &str, env: &impl EnvSource) -> Utf8PathBuf {
    let Some(home) = env.non_empty(HOME_ENV) else {
        return Utf8PathBuf::from(raw);
    };
    if raw == "~" {
        return Utf8PathBuf::from(home);
    }
    raw.strip_prefix("~/").map_or_else(
        || Utf8PathBuf::from(raw),
        |rest| Utf8PathBuf::from(&home).join(rest),
    )
}

/// File-backed storage for a single token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenStore {
    path: Utf8PathBuf,
}

impl TokenStore {
    /// Uses `path` as the token file.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stores the token as `token` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Utf8Path>) -> Self {
        Self::new(dir.as_ref().join(TOKEN_FILE_NAME))
    }

    /// Locates the token file from the cache-root variables.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::NoCacheRoot`] when no cache root can be
    /// derived.
    pub fn from_env(env: &impl EnvSource) -> Result<Self, TokenStoreError> {
        cache_home(env).map(Self::in_dir)
    }

    /// Path of the token file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Writes the token, creating parent directories and replacing any
    /// previous value.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] when the directory or file cannot be
    /// written.
    pub fn save(&self, token: &Token) -> Result<(), TokenStoreError> {
        files::write(&self.path, token.as_str()).map_err(|err| self.io_error(&err))?;
        debug!(path = %self.path, "saved token");
        Ok(())
    }

    /// Reads the stored token. A missing or blank file yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] for failures other than a missing file.
    pub fn load(&self) -> Result<Option<Token>, TokenStoreError> {
        let contents = files::read_optional(&self.path).map_err(|err| self.io_error(&err))?;
        Ok(contents
            .map(|raw| raw.trim_end_matches(['\r', '\n']).to_owned())
            .filter(|raw| !raw.is_empty())
            .map(Token::from))
    }

    /// Removes the stored token. Deleting an absent token succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] for failures other than a missing file.
    pub fn delete(&self) -> Result<(), TokenStoreError> {
        files::remove_if_exists(&self.path).map_err(|err| self.io_error(&err))?;
        debug!(path = %self.path, "deleted token");
        Ok(())
    }

    fn io_error(&self, err: &std::io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

/// Saves `token` so later calls pick it up.
///
/// # Errors
///
/// Returns [`TokenStoreError::Io`] when the token file cannot be written.
pub fn login(store: &TokenStore, token: &Token) -> Result<(), TokenStoreError> {
    store.save(token)?;
    info!(path = %store.path(), "logged in");
    Ok(())
}

/// Chooses the effective token for a call.
#[derive(Clone, Debug)]
pub struct TokenResolver<E = ProcessEnv> {
    store: TokenStore,
    env: E,
}

impl TokenResolver<ProcessEnv> {
    /// Builds a resolver over the process environment and its default token
    /// location.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::NoCacheRoot`] when no cache root can be
    /// derived.
    pub fn from_process_env() -> Result<Self, TokenStoreError> {
        let env = ProcessEnv;
        Ok(Self::new(TokenStore::from_env(&env)?, env))
    }
}

impl<E: EnvSource> TokenResolver<E> {
    /// Combines a token store with an environment.
    pub const fn new(store: TokenStore, env: E) -> Self {
        Self { store, env }
    }

    /// Store consulted after the environment override.
    #[must_use]
    pub const fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Returns `LAMBDA_TOKEN` when set, otherwise the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] when the token file exists but cannot
    /// be read.
    pub fn get(&self) -> Result<Option<Token>, TokenStoreError> {
        if let Some(token) = self.env.non_empty(LAMBDA_TOKEN_ENV) {
            return Ok(Some(Token::from(token)));
        }
        self.store.load()
    }

    /// Returns `explicit` when given, otherwise falls back to [`Self::get`].
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] when the fallback read fails.
    pub fn resolve(&self, explicit: Option<&Token>) -> Result<Option<Token>, TokenStoreError> {
        match explicit {
            Some(token) => Ok(Some(token.clone())),
            None => self.get(),
        }
    }
}
