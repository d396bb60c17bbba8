use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session: the sign-in flow and the navigation
/// surface. Navigation is fail-soft, so an anonymous caller simply gets the
/// login view back instead of an error.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers, plus config status.
        .route("/health", get(handlers::health_check))
        // GET /session
        // anonymous | authenticating | authenticated, plus the Identity when signed in.
        .route("/session", get(handlers::get_session))
        // POST /session/login
        .route("/session/login", post(handlers::login))
        // POST /session/logout
        // Always 204; identity store failures are logged, not returned.
        .route("/session/logout", post(handlers::logout))
        // GET /view
        // Renders whatever the navigator currently points at.
        .route("/view", get(handlers::get_view))
        // POST /navigate
        // Runs the Route Authorizer and renders the resolved view.
        .route("/navigate", post(handlers::navigate))
}
