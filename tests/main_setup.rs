use serial_test::serial;
use std::{env, panic, path::PathBuf};
use uniadmin_portal::{
    AppConfig,
    config::{Env, IdentityStoreEndpoint},
    error::AuthError,
};

const VARS: [&str; 6] = [
    "APP_ENV",
    "BIND_ADDR",
    "SUPABASE_URL",
    "SUPABASE_ANON_KEY",
    "SUPABASE_JWT_SECRET",
    "SESSION_CACHE_PATH",
];

// --- Setup/Teardown Utilities ---

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T, cleanup_vars: Vec<&'static str>) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables
    let originals: Vec<(String, Option<String>)> = cleanup_vars
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    let result = panic::catch_unwind(test);

    // Restore original environment variables
    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

fn clear_all() {
    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_missing_identity_store_secrets_do_not_panic() {
    let config = run_with_env(
        || {
            clear_all();
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            AppConfig::load()
        },
        VARS.to_vec(),
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.identity_store_url, None);
    assert_eq!(
        config.identity_store_endpoint(),
        Err(AuthError::ConfigurationMissing("SUPABASE_URL"))
    );
}

#[test]
#[serial]
fn test_missing_key_is_named() {
    let config = run_with_env(
        || {
            clear_all();
            unsafe {
                env::set_var("SUPABASE_URL", "https://project.supabase.co");
                // Blank values count as missing.
                env::set_var("SUPABASE_ANON_KEY", "   ");
            }
            AppConfig::load()
        },
        VARS.to_vec(),
    );

    assert_eq!(
        config.identity_store_endpoint(),
        Err(AuthError::ConfigurationMissing("SUPABASE_ANON_KEY"))
    );
}

#[test]
#[serial]
fn test_local_env_defaults() {
    let config = run_with_env(
        || {
            clear_all();
            AppConfig::load()
        },
        VARS.to_vec(),
    );

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.jwt_secret, None);
    assert_eq!(config.session_cache_path, None);
}

#[test]
#[serial]
fn test_full_configuration() {
    let config = run_with_env(
        || {
            clear_all();
            unsafe {
                env::set_var("APP_ENV", "local");
                env::set_var("BIND_ADDR", "127.0.0.1:8080");
                env::set_var("SUPABASE_URL", "https://project.supabase.co/");
                env::set_var("SUPABASE_ANON_KEY", "anon-key");
                env::set_var("SUPABASE_JWT_SECRET", "jwt-secret");
                env::set_var("SESSION_CACHE_PATH", "/tmp/uniadmin-session.json");
            }
            AppConfig::load()
        },
        VARS.to_vec(),
    );

    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    // Trailing slash is trimmed so endpoint paths can be appended directly.
    assert_eq!(
        config.identity_store_endpoint(),
        Ok(IdentityStoreEndpoint {
            url: "https://project.supabase.co".to_string(),
            api_key: "anon-key".to_string(),
        })
    );
    assert_eq!(config.jwt_secret.as_deref(), Some("jwt-secret"));
    assert_eq!(
        config.session_cache_path,
        Some(PathBuf::from("/tmp/uniadmin-session.json"))
    );
}

#[test]
fn test_default_config_has_no_identity_store() {
    let config = AppConfig::default();
    assert_eq!(config.env, Env::Local);
    assert!(matches!(
        config.identity_store_endpoint(),
        Err(AuthError::ConfigurationMissing(_))
    ));
}
