//! Credential sources for authenticated requests.
//!
//! The dashboard keeps its session token in a cookie named `refresh_token`.
//! [`CookieJar`] models that cookie store; a missing cookie simply means the
//! request goes out without an `Authorization` header.

use std::{
    env, fmt,
    sync::{PoisonError, RwLock},
};

/// Cookie carrying the bearer token for authenticated requests.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
/// Environment variable holding a `Cookie:`-style header for the CLI.
pub const COOKIE_ENV_VAR: &str = "STITCH_COOKIE";

/// Supplies the bearer token attached to authenticated requests.
pub trait CredentialSource: Send + Sync + fmt::Debug {
    /// Current token, or `None` when no credential is available.
    fn bearer_token(&self) -> Option<String>;
}

/// Credential source that never yields a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// Cookie store holding a `name=value; name=value` header string.
///
/// The header can be replaced at runtime (e.g. after a token refresh) and the
/// next request picks up the new value.
#[derive(Default)]
pub struct CookieJar {
    header: RwLock<String>,
}

impl CookieJar {
    pub fn from_header(header: impl Into<String>) -> Self {
        Self {
            header: RwLock::new(header.into()),
        }
    }

    /// Build a jar from [`COOKIE_ENV_VAR`]; an unset variable yields an empty jar.
    pub fn from_env() -> Self {
        Self::from_header(env::var(COOKIE_ENV_VAR).unwrap_or_default())
    }

    pub fn replace_header(&self, header: impl Into<String>) {
        *self.header.write().unwrap_or_else(PoisonError::into_inner) = header.into();
    }

    /// Look up a cookie value by name. Empty values count as absent.
    pub fn get(&self, name: &str) -> Option<String> {
        let header = self.header.read().unwrap_or_else(PoisonError::into_inner);
        cookie_value(&header, name)
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("CookieJar")
            .field("header", &stitch_util::redact_sensitive(&header))
            .finish()
    }
}

impl CredentialSource for CookieJar {
    fn bearer_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_COOKIE)
    }
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}
