use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session and RBAC core.
pub mod access;
pub mod auth;
pub mod directory;
pub mod error;
pub mod identity_store;
pub mod models;
pub mod session;

// Data and screens.
pub mod academics;
pub mod repository;
pub mod seed;
pub mod views;

pub mod config;
pub mod handlers;

// Module for routing segregation (Public, Authenticated, Faculty, Admin).
pub mod routes;
use auth::CurrentUser;
use routes::{admin, authenticated, faculty, public};

// --- Public Re-exports ---

pub use access::{Navigator, NavigatorState};
pub use config::AppConfig;
pub use directory::LocalRoleDirectory;
pub use identity_store::{IdentityStoreState, SupabaseIdentityStore, UnconfiguredIdentityStore};
pub use repository::{InMemoryRepository, RepositoryState};
pub use session::{SessionManager, SessionState};

/// ApiDoc
///
/// Generates the OpenAPI document served at `/api-docs/openapi.json` from every
/// handler annotated with `#[utoipa::path]`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check, handlers::get_session, handlers::login, handlers::logout, handlers::get_view,
        handlers::navigate, handlers::get_me, handlers::update_me, handlers::get_navigation,
        handlers::get_courses, handlers::get_announcements, handlers::get_notifications,
        handlers::mark_notification_read, handlers::mark_all_notifications_read,
        handlers::delete_notification, handlers::get_assignments, handlers::submit_assignment,
        handlers::get_leave_requests, handlers::create_leave_request, handlers::get_reevaluations,
        handlers::create_reevaluation, handlers::get_cgpa, handlers::get_pending_reviews,
        handlers::get_faculty_tasks, handlers::toggle_task, handlers::get_admin_stats,
        handlers::get_users, handlers::get_workflows, handlers::update_workflow_status,
        handlers::get_alerts, handlers::get_activities, handlers::publish_announcement
    ),
    components(
        schemas(
            models::Role, models::Identity, models::RoleProfile, models::LoginRequest,
            models::UpdateUserRequest, models::ProfilePatch, models::NavigateRequest,
            access::ViewId, access::Resolution, access::NavItem,
            views::Screen, views::RenderedView, session::SessionSnapshot, session::SessionStatus,
            error::ErrorBody, handlers::ReadAllResponse, handlers::HealthResponse,
        )
    ),
    tags(
        (name = "uniadmin-portal", description = "UniAdmin academic administration portal API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single container for everything a handler may need. Cloning is cheap:
/// every service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Owner of the current-Identity slot.
    pub session: SessionState,
    /// Last requested view path.
    pub navigator: NavigatorState,
    /// Seeded academic and administrative data.
    pub repo: RepositoryState,
    pub config: AppConfig,
}

impl AppState {
    /// Wires a Session Manager over `store` and the seeded local directory.
    pub fn new(store: IdentityStoreState, repo: RepositoryState, config: AppConfig) -> Self {
        Self::with_directory(store, repo, config, LocalRoleDirectory::seeded())
    }

    /// Same as `new`, over a caller-supplied faculty/admin directory.
    pub fn with_directory(
        store: IdentityStoreState,
        repo: RepositoryState,
        config: AppConfig,
        directory: LocalRoleDirectory,
    ) -> Self {
        let directory = Arc::new(directory);
        Self {
            session: Arc::new(SessionManager::new(store, directory)),
            navigator: Arc::new(Navigator::new()),
            repo,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.session.clone()
    }
}

impl FromRef<AppState> for NavigatorState {
    fn from_ref(app_state: &AppState) -> NavigatorState {
        app_state.navigator.clone()
    }
}

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards `authenticated_routes`. Extracting `CurrentUser` fails with 401 when
/// the session is anonymous, so the handler never runs.
async fn auth_middleware(_user: CurrentUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, applies the session guard and the observability
/// layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Authenticated Routes: 401 for anonymous sessions.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Role-scoped routes. The role check happens inside each handler.
        .nest("/faculty", faculty::faculty_routes())
        .nest("/admin", admin::admin_routes())
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line of one request carries the
/// same `req_id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
