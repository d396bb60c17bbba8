use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Admin Router Module
///
/// Nested under `/admin`. Every handler requires the admin role; publishing an
/// announcement also requires the `announcements.publish` permission.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Counters and resource usage shown on the admin dashboard.
        .route("/stats", get(handlers::get_admin_stats))
        // GET /admin/users
        // Read-only listing of the local directory.
        .route("/users", get(handlers::get_users))
        .route("/workflows", get(handlers::get_workflows))
        .route(
            "/workflows/{id}/status",
            patch(handlers::update_workflow_status),
        )
        .route("/alerts", get(handlers::get_alerts))
        .route("/activities", get(handlers::get_activities))
        .route("/announcements", post(handlers::publish_announcement))
}
