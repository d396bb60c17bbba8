use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    academics::{self, ATTENDANCE_THRESHOLD, CgpaSummary, EXAM_TYPES},
    access::{Resolution, ViewId, authorize_path},
    directory::LocalRoleDirectory,
    models::{
        Activity, Announcement, Assignment, AssignmentStatus, Course, DirectoryEntry, FacultyTask,
        Identity, LeaveKind, LeaveRequest, Notification, PendingReview, ReevaluationRequest, Role,
        RoleProfile, SystemAlert, SystemStats, Workflow,
    },
    repository::Repository,
};

// --- View Models ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct StudentStats {
    pub cgpa: f64,
    pub attendance: f64,
    pub below_attendance_threshold: bool,
    pub pending_assignments: usize,
    pub unread_notifications: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CourseAttendance {
    pub course_id: String,
    pub name: String,
    pub attendance: f64,
    pub below_threshold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LeaveTypeOption {
    pub kind: LeaveKind,
    pub label: String,
}

/// RenderedView
///
/// The content of one screen, tagged by `view`. Each variant carries exactly
/// the data its screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "view", rename_all = "snake_case")]
#[ts(export)]
pub enum RenderedView {
    Login {
        roles: Vec<Role>,
    },
    StudentDashboard {
        name: String,
        stats: StudentStats,
        courses: Vec<Course>,
        upcoming_assignments: Vec<Assignment>,
        recent_notifications: Vec<Notification>,
        announcements: Vec<Announcement>,
    },
    FacultyDashboard {
        name: String,
        designation: String,
        courses: Vec<Course>,
        pending_reviews: Vec<PendingReview>,
        tasks: Vec<FacultyTask>,
        announcements: Vec<Announcement>,
    },
    AdminDashboard {
        name: String,
        stats: SystemStats,
        workflows: Vec<Workflow>,
        activities: Vec<Activity>,
        alerts: Vec<SystemAlert>,
    },
    StudentProfile {
        identity: Identity,
        courses: Vec<Course>,
    },
    Assignments {
        assignments: Vec<Assignment>,
        pending: usize,
    },
    ExamReevaluation {
        courses: Vec<Course>,
        exam_types: Vec<String>,
        requests: Vec<ReevaluationRequest>,
    },
    Attendance {
        overall: f64,
        threshold: f64,
        below_threshold: bool,
        courses: Vec<CourseAttendance>,
    },
    LeaveRequests {
        leave_types: Vec<LeaveTypeOption>,
        requests: Vec<LeaveRequest>,
    },
    Notifications {
        notifications: Vec<Notification>,
        unread_count: usize,
    },
    CgpaCalculator {
        summary: CgpaSummary,
    },
    Review {
        reviews: Vec<PendingReview>,
    },
    UserManagement {
        users: Vec<DirectoryEntry>,
    },
    Workflows {
        workflows: Vec<Workflow>,
    },
    SystemMonitor {
        stats: SystemStats,
        alerts: Vec<SystemAlert>,
    },
    Announcements {
        announcements: Vec<Announcement>,
        can_publish: bool,
    },
    Placeholder {
        title: String,
        description: String,
        active_path: String,
    },
}

/// Screen
///
/// Output schema for `GET /view` and `POST /navigate`: what was asked for, how
/// the Route Authorizer resolved it and the rendered content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Screen {
    pub requested: String,
    pub active_path: String,
    pub resolution: Resolution,
    pub content: RenderedView,
}

/// Resolves `requested` for `identity` and renders the result.
pub async fn screen(
    requested: String,
    identity: Option<&Identity>,
    repo: &dyn Repository,
    directory: &LocalRoleDirectory,
) -> Screen {
    let resolution = authorize_path(identity.map(Identity::role), &requested);
    let content = render(&resolution, identity, repo, directory).await;
    Screen {
        requested,
        active_path: resolution.active_path(),
        resolution,
        content,
    }
}

/// render
///
/// Builds the content for an already authorized resolution. Views are only
/// ever rendered for the role the authorizer granted them to.
pub async fn render(
    resolution: &Resolution,
    identity: Option<&Identity>,
    repo: &dyn Repository,
    directory: &LocalRoleDirectory,
) -> RenderedView {
    let (identity, view) = match (identity, resolution) {
        (Some(identity), Resolution::Granted { view } | Resolution::Fallback { view, .. }) => {
            (identity, *view)
        }
        (Some(_), Resolution::Placeholder {
            requested,
            title,
            description,
        }) => {
            return RenderedView::Placeholder {
                title: title.clone(),
                description: description.clone(),
                active_path: requested.clone(),
            };
        }
        _ => return login(),
    };

    match view {
        ViewId::Login => login(),
        ViewId::Dashboard => dashboard(identity, repo).await,
        ViewId::Profile | ViewId::Courses => RenderedView::StudentProfile {
            identity: identity.clone(),
            courses: identity.courses().to_vec(),
        },
        ViewId::Assignments | ViewId::SubmitAssignment => {
            let assignments = repo.assignments().await;
            RenderedView::Assignments {
                pending: count_open(&assignments),
                assignments,
            }
        }
        ViewId::Reevaluation => RenderedView::ExamReevaluation {
            courses: identity.courses().to_vec(),
            exam_types: EXAM_TYPES.iter().map(|t| t.to_string()).collect(),
            requests: repo.reevaluation_requests().await,
        },
        ViewId::Attendance | ViewId::ViewAttendance => attendance(identity),
        ViewId::LeaveRequest => RenderedView::LeaveRequests {
            leave_types: LeaveKind::ALL
                .iter()
                .map(|kind| LeaveTypeOption {
                    kind: *kind,
                    label: kind.label().to_string(),
                })
                .collect(),
            requests: repo.leave_requests().await,
        },
        ViewId::Notifications => {
            let notifications = repo.notifications().await;
            RenderedView::Notifications {
                unread_count: notifications.iter().filter(|n| !n.read).count(),
                notifications,
            }
        }
        ViewId::CgpaCalculator => RenderedView::CgpaCalculator {
            summary: academics::summarize(&repo.semester_records().await),
        },
        ViewId::Review => RenderedView::Review {
            reviews: repo.pending_reviews().await,
        },
        ViewId::Users => RenderedView::UserManagement {
            users: directory.identities().map(DirectoryEntry::from).collect(),
        },
        ViewId::Workflows => RenderedView::Workflows {
            workflows: repo.workflows().await,
        },
        ViewId::Monitor => RenderedView::SystemMonitor {
            stats: repo.stats().await,
            alerts: repo.alerts().await,
        },
        ViewId::Announcements => RenderedView::Announcements {
            announcements: visible_announcements(repo, identity.role()).await,
            can_publish: identity.has_permission("announcements.publish"),
        },
        ViewId::Settings => placeholder(ViewId::Settings),
    }
}

fn login() -> RenderedView {
    RenderedView::Login {
        roles: Role::ALL.to_vec(),
    }
}

fn placeholder(view: ViewId) -> RenderedView {
    let meta = view.meta();
    RenderedView::Placeholder {
        title: meta.title.to_string(),
        description: meta.description.to_string(),
        active_path: view.path(),
    }
}

fn count_open(assignments: &[Assignment]) -> usize {
    assignments
        .iter()
        .filter(|a| matches!(a.status, AssignmentStatus::Pending | AssignmentStatus::Overdue))
        .count()
}

/// Announcements `role` is allowed to read, newest first.
pub async fn visible_announcements(repo: &dyn Repository, role: Role) -> Vec<Announcement> {
    repo.announcements()
        .await
        .into_iter()
        .filter(|a| a.visible_to(role))
        .collect()
}

async fn dashboard(identity: &Identity, repo: &dyn Repository) -> RenderedView {
    let announcements = visible_announcements(repo, identity.role()).await;

    match identity.role() {
        Role::Student => {
            let assignments = repo.assignments().await;
            let notifications = repo.notifications().await;
            let (cgpa, attendance) = identity
                .as_student()
                .map(|s| (s.cgpa, s.attendance))
                .unwrap_or_default();

            RenderedView::StudentDashboard {
                name: identity.name.clone(),
                stats: StudentStats {
                    cgpa,
                    attendance,
                    below_attendance_threshold: academics::below_threshold(attendance),
                    pending_assignments: count_open(&assignments),
                    unread_notifications: notifications.iter().filter(|n| !n.read).count(),
                },
                courses: identity.courses().to_vec(),
                upcoming_assignments: assignments
                    .into_iter()
                    .filter(|a| matches!(a.status, AssignmentStatus::Pending | AssignmentStatus::Overdue))
                    .collect(),
                recent_notifications: notifications.into_iter().take(3).collect(),
                announcements,
            }
        }
        Role::Faculty => {
            let designation = match &identity.profile {
                RoleProfile::Faculty(faculty) => faculty.designation.clone(),
                _ => String::new(),
            };
            RenderedView::FacultyDashboard {
                name: identity.name.clone(),
                designation,
                courses: identity.courses().to_vec(),
                pending_reviews: repo.pending_reviews().await,
                tasks: repo.faculty_tasks().await,
                announcements,
            }
        }
        Role::Admin => RenderedView::AdminDashboard {
            name: identity.name.clone(),
            stats: repo.stats().await,
            workflows: repo.workflows().await,
            activities: repo.activities().await,
            alerts: repo.alerts().await,
        },
    }
}

fn attendance(identity: &Identity) -> RenderedView {
    let overall = identity.as_student().map(|s| s.attendance).unwrap_or_default();
    let courses = identity
        .courses()
        .iter()
        .map(|course| {
            let attendance = course.attendance.unwrap_or_default();
            CourseAttendance {
                course_id: course.id.clone(),
                name: course.name.clone(),
                attendance,
                below_threshold: academics::below_threshold(attendance),
            }
        })
        .collect();

    RenderedView::Attendance {
        overall,
        threshold: ATTENDANCE_THRESHOLD,
        below_threshold: academics::below_threshold(overall),
        courses,
    }
}
