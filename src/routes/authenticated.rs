use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

/// Authenticated Router Module
///
/// Routes for any signed-in role. The router is wrapped in the `CurrentUser`
/// middleware (see `create_router`), so anonymous callers get 401 before a
/// handler runs.
///
/// Student data endpoints additionally call `CurrentUser::require_role` and
/// answer 403 to faculty and admins.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Profile ---
        .route("/me", get(handlers::get_me).patch(handlers::update_me))
        // GET /navigation
        // Sidebar entries for the caller's role.
        .route("/navigation", get(handlers::get_navigation))
        .route("/courses", get(handlers::get_courses))
        .route("/announcements", get(handlers::get_announcements))
        // --- Notifications ---
        .route("/notifications", get(handlers::get_notifications))
        .route(
            "/notifications/read-all",
            post(handlers::mark_all_notifications_read),
        )
        .route(
            "/notifications/{id}/read",
            patch(handlers::mark_notification_read),
        )
        .route("/notifications/{id}", delete(handlers::delete_notification))
        // --- Coursework ---
        .route("/assignments", get(handlers::get_assignments))
        // POST /assignments/{id}/submit
        // Only pending or overdue work can be submitted.
        .route(
            "/assignments/{id}/submit",
            post(handlers::submit_assignment),
        )
        .route(
            "/leave-requests",
            get(handlers::get_leave_requests).post(handlers::create_leave_request),
        )
        .route(
            "/reevaluations",
            get(handlers::get_reevaluations).post(handlers::create_reevaluation),
        )
        .route("/cgpa", get(handlers::get_cgpa))
}
