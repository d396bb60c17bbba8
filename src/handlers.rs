use crate::{
    AppState,
    academics::{self, CgpaSummary},
    access::{NavItem, navigation_for},
    auth::CurrentUser,
    config::{AppConfig, Env},
    error::{ErrorBody, PortalError},
    models::{
        Activity, Announcement, Assignment, Course, DirectoryEntry, FacultyTask, Identity,
        LeaveRequest, LoginRequest, NavigateRequest, NewAnnouncement, NewLeaveRequest,
        NewReevaluationRequest, Notification, PendingReview, ReevaluationRequest, Role,
        SystemAlert, SystemStats, UpdateUserRequest, Workflow, WorkflowStatusRequest,
    },
    session::SessionSnapshot,
    views::{self, Screen},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Permission an admin needs to publish announcements.
pub const PUBLISH_PERMISSION: &str = "announcements.publish";

/// ReadAllResponse
///
/// Output of `POST /notifications/read-all`: how many notifications changed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadAllResponse {
    pub updated: usize,
}

/// HealthResponse
///
/// Output of `GET /health`. `identity_store` is `configured` or names the first
/// missing variable.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
    pub identity_store: String,
}

/// health_check
///
/// [Public Route] Liveness probe. Also reports whether the identity store
/// secrets were provided, so a degraded student sign-in is visible from outside.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check(State(config): State<AppConfig>) -> Json<HealthResponse> {
    let identity_store = match config.identity_store_endpoint() {
        Ok(_) => "configured".to_string(),
        Err(e) => e.to_string(),
    };
    let environment = match config.env {
        Env::Local => "local",
        Env::Production => "production",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        environment: environment.to_string(),
        identity_store,
    })
}

// --- Session & Navigation (Public) ---

/// get_session
///
/// [Public Route] Reports the session status and, when signed in, the Identity.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Session status", body = SessionSnapshot))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

/// login
///
/// [Public Route] Signs in under the requested role. Students are verified by
/// the identity store; faculty and admins by the local directory.
///
/// A successful sign-in replaces any current session and sends navigation back
/// to the dashboard.
#[utoipa::path(
    post,
    path = "/session/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = Identity),
        (status = 401, description = "Unknown account or wrong password", body = ErrorBody),
        (status = 403, description = "Email reserved for another role", body = ErrorBody),
        (status = 502, description = "Identity store unavailable", body = ErrorBody),
        (status = 503, description = "Identity store not configured", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Identity>, PortalError> {
    let identity = state
        .session
        .login(&payload.email, &payload.password, payload.role)
        .await?;
    state.navigator.reset().await;
    Ok(Json(identity))
}

/// logout
///
/// [Public Route] Always succeeds, even when the identity store cannot be reached.
#[utoipa::path(
    post,
    path = "/session/logout",
    responses((status = 204, description = "Signed out"))
)]
pub async fn logout(State(state): State<AppState>) -> StatusCode {
    state.session.logout().await;
    StatusCode::NO_CONTENT
}

/// get_view
///
/// [Public Route] Renders the current navigation target for the current session.
/// Anonymous sessions always get the login view.
#[utoipa::path(
    get,
    path = "/view",
    responses((status = 200, description = "Current screen", body = Screen))
)]
pub async fn get_view(State(state): State<AppState>) -> Json<Screen> {
    let requested = state.navigator.current().await;
    let identity = state.session.current().await;
    let screen = views::screen(
        requested,
        identity.as_ref(),
        state.repo.as_ref(),
        state.session.directory(),
    )
    .await;
    Json(screen)
}

/// navigate
///
/// [Public Route] Records a navigation request and renders the resolved view.
/// Never fails: unknown or forbidden views resolve to a fallback or placeholder.
#[utoipa::path(
    post,
    path = "/navigate",
    request_body = NavigateRequest,
    responses((status = 200, description = "Resolved screen", body = Screen))
)]
pub async fn navigate(
    State(state): State<AppState>,
    Json(payload): Json<NavigateRequest>,
) -> Json<Screen> {
    let requested = state.navigator.navigate(&payload.view).await;
    let identity = state.session.current().await;
    let screen = views::screen(
        requested,
        identity.as_ref(),
        state.repo.as_ref(),
        state.session.directory(),
    )
    .await;

    tracing::debug!(
        requested = %screen.requested,
        active = %screen.active_path,
        "navigation resolved"
    );
    Json(screen)
}

// --- Profile (Authenticated) ---

/// get_me
///
/// [Authenticated Route] Returns the current Identity.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current identity", body = Identity),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn get_me(CurrentUser(identity): CurrentUser) -> Json<Identity> {
    Json(identity)
}

/// update_me
///
/// [Authenticated Route] Shallow-merges profile fields into the current Identity.
/// Attempts to change the role are rejected with 422.
#[utoipa::path(
    patch,
    path = "/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated identity", body = Identity),
        (status = 422, description = "Role cannot change", body = ErrorBody)
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Identity>, PortalError> {
    state
        .session
        .update_user(payload)
        .await?
        .map(Json)
        .ok_or(PortalError::NotAuthenticated)
}

/// get_navigation
///
/// [Authenticated Route] The sidebar menu for the caller's role.
#[utoipa::path(
    get,
    path = "/navigation",
    responses((status = 200, description = "Sidebar entries", body = [NavItem]))
)]
pub async fn get_navigation(CurrentUser(identity): CurrentUser) -> Json<Vec<NavItem>> {
    Json(navigation_for(identity.role()))
}

/// get_courses
///
/// [Authenticated Route] Students get their enrolled courses, faculty the
/// courses they teach and admins the full catalog.
#[utoipa::path(
    get,
    path = "/courses",
    responses((status = 200, description = "Courses", body = [Course]))
)]
pub async fn get_courses(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
) -> Json<Vec<Course>> {
    match identity.role() {
        Role::Student | Role::Faculty => Json(identity.courses().to_vec()),
        Role::Admin => Json(state.repo.courses().await),
    }
}

/// get_announcements
///
/// [Authenticated Route] Announcements targeted at the caller's role.
#[utoipa::path(
    get,
    path = "/announcements",
    responses((status = 200, description = "Visible announcements", body = [Announcement]))
)]
pub async fn get_announcements(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
) -> Json<Vec<Announcement>> {
    Json(views::visible_announcements(state.repo.as_ref(), identity.role()).await)
}

// --- Notifications (Student) ---

/// get_notifications
///
/// [Student Route] Lists the student's notifications, newest first.
#[utoipa::path(
    get,
    path = "/notifications",
    responses(
        (status = 200, description = "Notifications", body = [Notification]),
        (status = 403, description = "Not a student", body = ErrorBody)
    )
)]
pub async fn get_notifications(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, PortalError> {
    user.require_role(Role::Student)?;
    Ok(Json(state.repo.notifications().await))
}

/// mark_notification_read
///
/// [Student Route] Marks one notification as read.
#[utoipa::path(
    patch,
    path = "/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Marked as read"),
        (status = 404, description = "No such notification", body = ErrorBody)
    )
)]
pub async fn mark_notification_read(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, PortalError> {
    user.require_role(Role::Student)?;
    if state.repo.mark_notification_read(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(PortalError::NotFound(format!("notification {id}")))
    }
}

/// mark_all_notifications_read
///
/// [Student Route] Marks every notification as read.
#[utoipa::path(
    post,
    path = "/notifications/read-all",
    responses((status = 200, description = "Number of notifications changed", body = ReadAllResponse))
)]
pub async fn mark_all_notifications_read(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ReadAllResponse>, PortalError> {
    user.require_role(Role::Student)?;
    let updated = state.repo.mark_all_notifications_read().await;
    Ok(Json(ReadAllResponse { updated }))
}

/// delete_notification
///
/// [Student Route] Dismisses a notification.
#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    params(("id" = String, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such notification", body = ErrorBody)
    )
)]
pub async fn delete_notification(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, PortalError> {
    user.require_role(Role::Student)?;
    if state.repo.delete_notification(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(PortalError::NotFound(format!("notification {id}")))
    }
}

// --- Coursework (Student) ---

#[utoipa::path(
    get,
    path = "/assignments",
    responses((status = 200, description = "Assignments", body = [Assignment]))
)]
pub async fn get_assignments(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Assignment>>, PortalError> {
    user.require_role(Role::Student)?;
    Ok(Json(state.repo.assignments().await))
}

/// submit_assignment
///
/// [Student Route] Submits a pending or overdue assignment.
#[utoipa::path(
    post,
    path = "/assignments/{id}/submit",
    params(("id" = String, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Submitted", body = Assignment),
        (status = 404, description = "No such assignment", body = ErrorBody),
        (status = 422, description = "Already submitted or graded", body = ErrorBody)
    )
)]
pub async fn submit_assignment(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Assignment>, PortalError> {
    user.require_role(Role::Student)?;
    let now = chrono::Local::now().naive_local();
    let assignment = state.repo.submit_assignment(&id, now).await?;
    Ok(Json(assignment))
}

#[utoipa::path(
    get,
    path = "/leave-requests",
    responses((status = 200, description = "Leave requests", body = [LeaveRequest]))
)]
pub async fn get_leave_requests(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaveRequest>>, PortalError> {
    user.require_role(Role::Student)?;
    Ok(Json(state.repo.leave_requests().await))
}

/// create_leave_request
///
/// [Student Route] Files a leave request after validating dates and reason.
#[utoipa::path(
    post,
    path = "/leave-requests",
    request_body = NewLeaveRequest,
    responses(
        (status = 201, description = "Filed", body = LeaveRequest),
        (status = 422, description = "Invalid dates or reason", body = ErrorBody)
    )
)]
pub async fn create_leave_request(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<NewLeaveRequest>,
) -> Result<impl IntoResponse, PortalError> {
    user.require_role(Role::Student)?;
    let today = chrono::Local::now().date_naive();
    let days = academics::validate_leave(&payload, today)?;
    tracing::debug!(days, "leave request validated");

    let request = state.repo.add_leave_request(payload).await;
    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    get,
    path = "/reevaluations",
    responses((status = 200, description = "Re-evaluation requests", body = [ReevaluationRequest]))
)]
pub async fn get_reevaluations(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ReevaluationRequest>>, PortalError> {
    user.require_role(Role::Student)?;
    Ok(Json(state.repo.reevaluation_requests().await))
}

/// create_reevaluation
///
/// [Student Route] Requests a re-evaluation for one of the student's own courses.
#[utoipa::path(
    post,
    path = "/reevaluations",
    request_body = NewReevaluationRequest,
    responses(
        (status = 201, description = "Requested", body = ReevaluationRequest),
        (status = 422, description = "Unknown course, exam type or short reason", body = ErrorBody)
    )
)]
pub async fn create_reevaluation(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<NewReevaluationRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let identity = user.require_role(Role::Student)?;
    let course = academics::validate_reevaluation(&payload, identity.courses())?;

    let request = state
        .repo
        .add_reevaluation_request(course, payload.exam_type, payload.reason)
        .await;
    Ok((StatusCode::CREATED, Json(request)))
}

/// get_cgpa
///
/// [Student Route] Semester history with SGPA, CGPA and projection.
#[utoipa::path(
    get,
    path = "/cgpa",
    responses((status = 200, description = "CGPA summary", body = CgpaSummary))
)]
pub async fn get_cgpa(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CgpaSummary>, PortalError> {
    user.require_role(Role::Student)?;
    let records = state.repo.semester_records().await;
    Ok(Json(academics::summarize(&records)))
}

// --- Faculty ---

#[utoipa::path(
    get,
    path = "/faculty/reviews",
    responses((status = 200, description = "Submissions awaiting review", body = [PendingReview]))
)]
pub async fn get_pending_reviews(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingReview>>, PortalError> {
    user.require_role(Role::Faculty)?;
    Ok(Json(state.repo.pending_reviews().await))
}

#[utoipa::path(
    get,
    path = "/faculty/tasks",
    responses((status = 200, description = "Faculty tasks", body = [FacultyTask]))
)]
pub async fn get_faculty_tasks(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<FacultyTask>>, PortalError> {
    user.require_role(Role::Faculty)?;
    Ok(Json(state.repo.faculty_tasks().await))
}

/// toggle_task
///
/// [Faculty Route] Flips a task between done and not done.
#[utoipa::path(
    patch,
    path = "/faculty/tasks/{id}/toggle",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Updated task", body = FacultyTask),
        (status = 404, description = "No such task", body = ErrorBody)
    )
)]
pub async fn toggle_task(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FacultyTask>, PortalError> {
    user.require_role(Role::Faculty)?;
    state
        .repo
        .toggle_task(&id)
        .await
        .map(Json)
        .ok_or_else(|| PortalError::NotFound(format!("task {id}")))
}

// --- Admin ---

/// get_admin_stats
///
/// [Admin Route] System-wide counters and resource usage.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses(
        (status = 200, description = "System statistics", body = SystemStats),
        (status = 403, description = "Not an admin", body = ErrorBody)
    )
)]
pub async fn get_admin_stats(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SystemStats>, PortalError> {
    user.require_role(Role::Admin)?;
    Ok(Json(state.repo.stats().await))
}

/// get_users
///
/// [Admin Route] Read-only listing of the local directory.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses((status = 200, description = "Directory accounts", body = [DirectoryEntry]))
)]
pub async fn get_users(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<DirectoryEntry>>, PortalError> {
    user.require_role(Role::Admin)?;
    let users = state
        .session
        .directory()
        .identities()
        .map(DirectoryEntry::from)
        .collect();
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/admin/workflows",
    responses((status = 200, description = "Workflows", body = [Workflow]))
)]
pub async fn get_workflows(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Workflow>>, PortalError> {
    user.require_role(Role::Admin)?;
    Ok(Json(state.repo.workflows().await))
}

/// update_workflow_status
///
/// [Admin Route] Activates or deactivates a workflow.
#[utoipa::path(
    patch,
    path = "/admin/workflows/{id}/status",
    params(("id" = String, Path, description = "Workflow ID")),
    request_body = WorkflowStatusRequest,
    responses(
        (status = 200, description = "Updated workflow", body = Workflow),
        (status = 404, description = "No such workflow", body = ErrorBody)
    )
)]
pub async fn update_workflow_status(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<WorkflowStatusRequest>,
) -> Result<Json<Workflow>, PortalError> {
    user.require_role(Role::Admin)?;
    let workflow = state
        .repo
        .set_workflow_status(&id, payload.status)
        .await
        .ok_or_else(|| PortalError::NotFound(format!("workflow {id}")))?;

    tracing::info!(workflow = %id, status = ?payload.status, "workflow status changed");
    Ok(Json(workflow))
}

#[utoipa::path(
    get,
    path = "/admin/alerts",
    responses((status = 200, description = "System alerts", body = [SystemAlert]))
)]
pub async fn get_alerts(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SystemAlert>>, PortalError> {
    user.require_role(Role::Admin)?;
    Ok(Json(state.repo.alerts().await))
}

#[utoipa::path(
    get,
    path = "/admin/activities",
    responses((status = 200, description = "Recent activity", body = [Activity]))
)]
pub async fn get_activities(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Activity>>, PortalError> {
    user.require_role(Role::Admin)?;
    Ok(Json(state.repo.activities().await))
}

/// publish_announcement
///
/// [Admin Route] Publishes an announcement. Requires the `announcements.publish`
/// permission on top of the admin role.
#[utoipa::path(
    post,
    path = "/admin/announcements",
    request_body = NewAnnouncement,
    responses(
        (status = 201, description = "Published", body = Announcement),
        (status = 403, description = "Missing permission", body = ErrorBody),
        (status = 422, description = "Empty title or content", body = ErrorBody)
    )
)]
pub async fn publish_announcement(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<NewAnnouncement>,
) -> Result<impl IntoResponse, PortalError> {
    let identity = user.require_role(Role::Admin)?;
    if !identity.has_permission(PUBLISH_PERMISSION) {
        return Err(PortalError::Forbidden);
    }
    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return Err(PortalError::Validation(
            "title and content are required".to_string(),
        ));
    }

    let now = chrono::Local::now().naive_local();
    let announcement = state
        .repo
        .publish_announcement(payload, identity.name.clone(), now)
        .await;

    tracing::info!(id = %announcement.id, target = ?announcement.target, "announcement published");
    Ok((StatusCode::CREATED, Json(announcement)))
}
