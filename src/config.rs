use std::{env, path::PathBuf};

use crate::error::AuthError;

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_VAR: &str = "SUPABASE_ANON_KEY";

/// AppConfig
///
/// Holds the portal's configuration. Immutable once loaded and pulled into
/// handlers via `FromRef`, like every other piece of the shared state.
///
/// The two identity store secrets are optional on purpose: their absence is not
/// a startup failure. It surfaces as `AuthError::ConfigurationMissing` from
/// `identity_store_endpoint`, which the student sign-in path reports to the user.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Supabase project URL (identity store endpoint).
    pub identity_store_url: Option<String>,
    // Supabase anon API key.
    pub identity_store_key: Option<String>,
    // When set, restored session tokens are validated locally instead of via /auth/v1/user.
    pub jwt_secret: Option<String>,
    // File used to carry the identity store session across restarts.
    pub session_cache_path: Option<PathBuf>,
}

/// Env
///
/// Defines the runtime context: pretty logs for local work, JSON logs in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// IdentityStoreEndpoint
///
/// The validated pair of secrets needed to talk to the identity store.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentityStoreEndpoint {
    pub url: String,
    pub api_key: String,
}

impl Default for AppConfig {
    /// default
    ///
    /// A non-panicking configuration for tests: local env, no identity store.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:3000".to_string(),
            identity_store_url: None,
            identity_store_key: None,
            jwt_secret: None,
            session_cache_path: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. Never panics; empty
    /// values are treated as absent.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        Self {
            env,
            bind_addr: non_empty_var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            identity_store_url: non_empty_var(SUPABASE_URL_VAR)
                .map(|url| url.trim_end_matches('/').to_string()),
            identity_store_key: non_empty_var(SUPABASE_KEY_VAR),
            jwt_secret: non_empty_var("SUPABASE_JWT_SECRET"),
            session_cache_path: non_empty_var("SESSION_CACHE_PATH").map(PathBuf::from),
        }
    }

    /// identity_store_endpoint
    ///
    /// Returns the identity store URL and key, or names the first missing variable.
    pub fn identity_store_endpoint(&self) -> Result<IdentityStoreEndpoint, AuthError> {
        let url = self
            .identity_store_url
            .clone()
            .ok_or(AuthError::ConfigurationMissing(SUPABASE_URL_VAR))?;
        let api_key = self
            .identity_store_key
            .clone()
            .ok_or(AuthError::ConfigurationMissing(SUPABASE_KEY_VAR))?;
        Ok(IdentityStoreEndpoint { url, api_key })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
