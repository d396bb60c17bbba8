use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uniadmin_portal::{
    AppState, InMemoryRepository, IdentityStoreState, SupabaseIdentityStore,
    UnconfiguredIdentityStore,
    config::{AppConfig, Env, SUPABASE_URL_VAR},
    create_router,
    error::AuthError,
    repository::RepositoryState,
};

/// main
///
/// Loads configuration, initializes logging, wires the identity store, restores
/// any previous session and serves the HTTP API. Only a failure to bind the
/// listener is fatal.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for the portal, info for HTTP plumbing.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "uniadmin_portal=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON lines for log aggregation.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Identity Store
    // Missing secrets are not fatal: student sign-in reports them instead.
    let store: IdentityStoreState = match SupabaseIdentityStore::from_config(&config) {
        Ok(store) => {
            tracing::info!("Identity store configured");
            Arc::new(store)
        }
        Err(AuthError::ConfigurationMissing(var)) => {
            tracing::error!(missing = var, "Identity store is not configured; student sign-in is disabled");
            Arc::new(UnconfiguredIdentityStore::new(var))
        }
        Err(e) => {
            tracing::error!(error = %e, "Identity store could not be initialized");
            Arc::new(UnconfiguredIdentityStore::new(SUPABASE_URL_VAR))
        }
    };

    // 5. Seeded data
    let repo = Arc::new(InMemoryRepository::seeded()) as RepositoryState;

    // 6. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(store, repo, config);

    // 7. Session Restore
    // Failures are logged inside and leave the session anonymous.
    if let Some(identity) = app_state.session.restore_session().await {
        tracing::info!(email = %identity.email, "Resuming previous session");
    }

    // 8. Router and Server Startup
    let app = create_router(app_state);

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %bind_addr, error = %e, "FATAL: could not bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
    }
}
