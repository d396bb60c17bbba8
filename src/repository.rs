use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    academics::next_id,
    error::PortalError,
    models::{
        Activity, Announcement, Assignment, AssignmentStatus, Course, FacultyTask, LeaveRequest,
        LeaveStatus, NewAnnouncement, NewLeaveRequest, Notification, PendingReview,
        ReevaluationRequest, ReevaluationStatus, SemesterRecord, SystemAlert, SystemStats, Workflow,
        WorkflowStatus,
    },
    seed::Dataset,
};

/// Repository Trait
///
/// The data contract behind the portal's views and data endpoints. Handlers and
/// the view renderer only see `Arc<dyn Repository>`, never the storage behind it.
///
/// Lookups by id return `Option` (or `false`) when nothing matches; the handler
/// decides whether that becomes a 404.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Courses & Assignments ---
    async fn courses(&self) -> Vec<Course>;
    async fn assignments(&self) -> Vec<Assignment>;
    // Only pending/overdue assignments can move to submitted.
    async fn submit_assignment(&self, id: &str, at: NaiveDateTime) -> Result<Assignment, PortalError>;
    async fn semester_records(&self) -> Vec<SemesterRecord>;

    // --- Notifications ---
    async fn notifications(&self) -> Vec<Notification>;
    async fn mark_notification_read(&self, id: &str) -> bool;
    // Returns how many notifications changed.
    async fn mark_all_notifications_read(&self) -> usize;
    async fn delete_notification(&self, id: &str) -> bool;

    // --- Requests ---
    async fn leave_requests(&self) -> Vec<LeaveRequest>;
    /// Stores an already validated draft as a new pending request (newest first).
    async fn add_leave_request(&self, draft: NewLeaveRequest) -> LeaveRequest;
    async fn reevaluation_requests(&self) -> Vec<ReevaluationRequest>;
    async fn add_reevaluation_request(
        &self,
        course: &Course,
        exam_type: String,
        reason: String,
    ) -> ReevaluationRequest;

    // --- Administration ---
    async fn workflows(&self) -> Vec<Workflow>;
    async fn set_workflow_status(&self, id: &str, status: WorkflowStatus) -> Option<Workflow>;
    async fn announcements(&self) -> Vec<Announcement>;
    async fn publish_announcement(
        &self,
        draft: NewAnnouncement,
        author: String,
        at: NaiveDateTime,
    ) -> Announcement;
    async fn stats(&self) -> SystemStats;
    async fn activities(&self) -> Vec<Activity>;
    async fn alerts(&self) -> Vec<SystemAlert>;

    // --- Faculty Workload ---
    async fn pending_reviews(&self) -> Vec<PendingReview>;
    async fn faculty_tasks(&self) -> Vec<FacultyTask>;
    async fn toggle_task(&self, id: &str) -> Option<FacultyTask>;
}

/// RepositoryState
///
/// The concrete type used to share the data layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// InMemoryRepository
///
/// The `Repository` implementation backed by the seeded `Dataset`. One lock
/// guards the whole dataset; writes are rare and short.
pub struct InMemoryRepository {
    data: RwLock<Dataset>,
}

impl InMemoryRepository {
    pub fn new(data: Dataset) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    pub fn seeded() -> Self {
        Self::new(Dataset::seeded())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn courses(&self) -> Vec<Course> {
        self.data.read().await.courses.clone()
    }

    async fn assignments(&self) -> Vec<Assignment> {
        self.data.read().await.assignments.clone()
    }

    /// submit_assignment
    ///
    /// Marks the assignment `submitted` and stamps `submitted_at`.
    /// **Validation**: already submitted or graded work is rejected.
    async fn submit_assignment(&self, id: &str, at: NaiveDateTime) -> Result<Assignment, PortalError> {
        let mut data = self.data.write().await;
        let assignment = data
            .assignments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| PortalError::NotFound(format!("assignment {id}")))?;

        match assignment.status {
            AssignmentStatus::Pending | AssignmentStatus::Overdue => {
                assignment.status = AssignmentStatus::Submitted;
                assignment.submitted_at = Some(at);
                tracing::info!(assignment = %id, "assignment submitted");
                Ok(assignment.clone())
            }
            AssignmentStatus::Submitted | AssignmentStatus::Graded => Err(PortalError::Validation(
                format!("assignment {id} has already been submitted"),
            )),
        }
    }

    async fn semester_records(&self) -> Vec<SemesterRecord> {
        self.data.read().await.semesters.clone()
    }

    async fn notifications(&self) -> Vec<Notification> {
        self.data.read().await.notifications.clone()
    }

    async fn mark_notification_read(&self, id: &str) -> bool {
        let mut data = self.data.write().await;
        match data.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    async fn mark_all_notifications_read(&self) -> usize {
        let mut data = self.data.write().await;
        let mut updated = 0;
        for notification in data.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            updated += 1;
        }
        updated
    }

    async fn delete_notification(&self, id: &str) -> bool {
        let mut data = self.data.write().await;
        let before = data.notifications.len();
        data.notifications.retain(|n| n.id != id);
        data.notifications.len() < before
    }

    async fn leave_requests(&self) -> Vec<LeaveRequest> {
        self.data.read().await.leave_requests.clone()
    }

    async fn add_leave_request(&self, draft: NewLeaveRequest) -> LeaveRequest {
        let mut data = self.data.write().await;
        let request = LeaveRequest {
            id: next_id("LEV", data.leave_requests.len()),
            kind: draft.kind,
            from_date: draft.from_date,
            to_date: draft.to_date,
            reason: draft.reason.trim().to_string(),
            status: LeaveStatus::Pending,
            documents: draft.documents,
        };
        data.leave_requests.insert(0, request.clone());
        tracing::info!(id = %request.id, kind = ?request.kind, "leave request filed");
        request
    }

    async fn reevaluation_requests(&self) -> Vec<ReevaluationRequest> {
        self.data.read().await.reevaluations.clone()
    }

    async fn add_reevaluation_request(
        &self,
        course: &Course,
        exam_type: String,
        reason: String,
    ) -> ReevaluationRequest {
        let mut data = self.data.write().await;
        let request = ReevaluationRequest {
            id: next_id("REV", data.reevaluations.len()),
            course_id: course.id.clone(),
            course_name: course.name.clone(),
            exam_type,
            reason: reason.trim().to_string(),
            status: ReevaluationStatus::Pending,
            original_grade: course.grade.clone(),
            new_grade: None,
        };
        data.reevaluations.insert(0, request.clone());
        tracing::info!(id = %request.id, course = %request.course_id, "re-evaluation requested");
        request
    }

    async fn workflows(&self) -> Vec<Workflow> {
        self.data.read().await.workflows.clone()
    }

    async fn set_workflow_status(&self, id: &str, status: WorkflowStatus) -> Option<Workflow> {
        let mut data = self.data.write().await;
        let workflow = data.workflows.iter_mut().find(|w| w.id == id)?;
        workflow.status = status;
        Some(workflow.clone())
    }

    async fn announcements(&self) -> Vec<Announcement> {
        self.data.read().await.announcements.clone()
    }

    /// publish_announcement
    ///
    /// Prepends the announcement and records the action in the activity feed.
    async fn publish_announcement(
        &self,
        draft: NewAnnouncement,
        author: String,
        at: NaiveDateTime,
    ) -> Announcement {
        let mut data = self.data.write().await;
        let announcement = Announcement {
            id: next_id("ANN", data.announcements.len()),
            title: draft.title,
            content: draft.content,
            target: draft.target,
            priority: draft.priority,
            published_at: at,
            author,
        };
        data.announcements.insert(0, announcement.clone());

        let activity = Activity {
            id: next_id("ACT", data.activities.len()),
            user: announcement.author.clone(),
            action: "Published announcement".to_string(),
            target: announcement.title.clone(),
            timestamp: at,
        };
        data.activities.insert(0, activity);

        announcement
    }

    async fn stats(&self) -> SystemStats {
        self.data.read().await.stats.clone()
    }

    async fn activities(&self) -> Vec<Activity> {
        self.data.read().await.activities.clone()
    }

    async fn alerts(&self) -> Vec<SystemAlert> {
        self.data.read().await.alerts.clone()
    }

    async fn pending_reviews(&self) -> Vec<PendingReview> {
        self.data.read().await.pending_reviews.clone()
    }

    async fn faculty_tasks(&self) -> Vec<FacultyTask> {
        self.data.read().await.faculty_tasks.clone()
    }

    async fn toggle_task(&self, id: &str) -> Option<FacultyTask> {
        let mut data = self.data.write().await;
        let task = data.faculty_tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        Some(task.clone())
    }
}
