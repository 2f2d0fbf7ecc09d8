//! Environment lookup used by token and cache-path resolution.
//!
//! Resolution code takes an [`EnvSource`] instead of reading `std::env`
//! directly, so precedence rules can be tested with a [`MapEnv`] without
//! mutating the process environment.

use std::collections::BTreeMap;

/// Overrides the directory holding the token file.
pub const LAMBDA_HOME_ENV: &str = "LAMBDA_HOME";

/// Supplies a token directly, taking precedence over the stored file.
pub const LAMBDA_TOKEN_ENV: &str = "LAMBDA_TOKEN";

/// XDG cache root consulted when `LAMBDA_HOME` is unset.
pub const XDG_CACHE_HOME_ENV: &str = "XDG_CACHE_HOME";

/// Home directory used for `~` expansion and the default cache root.
pub const HOME_ENV: &str = "HOME";

/// Read-only view of environment variables.
pub trait EnvSource {
    /// Returns the raw value of `key`, if set.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns the value of `key` when it is set to something other than
    /// whitespace.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|value| !value.trim().is_empty())
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

/// Reads variables from the current process environment.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory environment, mainly for tests and embedding.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the environment with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}
