use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Faculty Router Module
///
/// Nested under `/faculty`. Each handler checks for the faculty role itself.
pub fn faculty_routes() -> Router<AppState> {
    Router::new()
        // GET /faculty/reviews
        // Submissions waiting to be graded.
        .route("/reviews", get(handlers::get_pending_reviews))
        .route("/tasks", get(handlers::get_faculty_tasks))
        // PATCH /faculty/tasks/{id}/toggle
        .route("/tasks/{id}/toggle", patch(handlers::toggle_task))
}
