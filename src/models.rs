use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::AuthError;

// --- Identity & Roles ---

/// Role
///
/// The closed set of user categories. Every RBAC decision in the portal matches
/// exhaustively on this enum, so adding a role is a compile-time event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Faculty, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity
///
/// The authenticated user's role-tagged profile record. The role is not stored
/// as a separate field: it is derived from the `profile` variant, which makes it
/// impossible for a student Identity to carry admin permissions.
///
/// On the wire the profile is flattened, so a student serialises as
/// `{"id": .., "email": .., "role": "student", "roll_number": .., ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Identity {
    pub id: String,
    // Always trimmed and lowercased (see `normalize_email`).
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(flatten)]
    pub profile: RoleProfile,
}

/// RoleProfile
///
/// Role-specific extension fields. The serde tag doubles as the Identity's role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "role", rename_all = "lowercase")]
#[ts(export)]
pub enum RoleProfile {
    Student(StudentProfile),
    Faculty(FacultyProfile),
    Admin(AdminProfile),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct StudentProfile {
    pub roll_number: String,
    pub program: String,
    pub semester: u8,
    pub cgpa: f64,
    /// Overall attendance percentage (0-100).
    pub attendance: f64,
    #[serde(default)]
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FacultyProfile {
    pub employee_id: String,
    pub designation: String,
    #[serde(default)]
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminProfile {
    pub employee_id: String,
    /// Dotted permission names, e.g. `announcements.publish`.
    pub permissions: Vec<String>,
}

impl Identity {
    pub fn role(&self) -> Role {
        match self.profile {
            RoleProfile::Student(_) => Role::Student,
            RoleProfile::Faculty(_) => Role::Faculty,
            RoleProfile::Admin(_) => Role::Admin,
        }
    }

    /// Courses the identity is enrolled in (student) or teaches (faculty).
    pub fn courses(&self) -> &[Course] {
        match &self.profile {
            RoleProfile::Student(student) => &student.courses,
            RoleProfile::Faculty(faculty) => &faculty.courses,
            RoleProfile::Admin(_) => &[],
        }
    }

    pub fn permissions(&self) -> &[String] {
        match &self.profile {
            RoleProfile::Admin(admin) => &admin.permissions,
            _ => &[],
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions().iter().any(|p| p == permission)
    }

    pub fn as_student(&self) -> Option<&StudentProfile> {
        match &self.profile {
            RoleProfile::Student(student) => Some(student),
            _ => None,
        }
    }

    /// apply
    ///
    /// Shallow-merges a partial update into this Identity.
    ///
    /// The role can never change through this path: a patch naming another role
    /// fails with `RoleImmutable`, and an extension patch for another role fails
    /// with `ProfileMismatch`. Nothing is written unless the whole patch is valid.
    pub fn apply(&mut self, patch: UpdateUserRequest) -> Result<(), AuthError> {
        let role = self.role();
        if let Some(requested) = patch.role {
            if requested != role {
                return Err(AuthError::RoleImmutable);
            }
        }
        if let Some(extension) = &patch.profile {
            if extension.role() != role {
                return Err(AuthError::ProfileMismatch);
            }
        }

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(department) = patch.department {
            self.department = Some(department);
        }
        if let Some(institution) = patch.institution {
            self.institution = Some(institution);
        }

        match (&mut self.profile, patch.profile) {
            (RoleProfile::Student(student), Some(ProfilePatch::Student { program, semester })) => {
                if let Some(program) = program {
                    student.program = program;
                }
                if let Some(semester) = semester {
                    student.semester = semester;
                }
            }
            (RoleProfile::Faculty(faculty), Some(ProfilePatch::Faculty { designation })) => {
                if let Some(designation) = designation {
                    faculty.designation = designation;
                }
            }
            // Mismatched pairs were rejected above; `None` means common fields only.
            _ => {}
        }

        Ok(())
    }
}

/// Trims and lowercases an email so directory and store lookups agree.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input payload for `POST /session/login`. Faculty and admin sign-in ignores
/// the password (directory presence plus role match is sufficient).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Role,
}

/// UpdateUserRequest
///
/// Partial update payload for `PATCH /me`. Only provided fields are merged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    /// Accepted only when equal to the current role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfilePatch>,
}

/// ProfilePatch
///
/// The self-editable extension fields. Grades, attendance and admin permissions
/// belong to the identity store or the directory and cannot be patched; admins
/// have no editable extension at all, so `{"role": "admin"}` is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "role", rename_all = "lowercase")]
#[ts(export)]
pub enum ProfilePatch {
    Student {
        #[serde(default)]
        program: Option<String>,
        #[serde(default)]
        semester: Option<u8>,
    },
    Faculty {
        #[serde(default)]
        designation: Option<String>,
    },
}

impl ProfilePatch {
    pub fn role(&self) -> Role {
        match self {
            ProfilePatch::Student { .. } => Role::Student,
            ProfilePatch::Faculty { .. } => Role::Faculty,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigateRequest {
    /// A view path such as `/cgpa-calculator` (the leading slash is optional).
    pub view: String,
}

/// NewLeaveRequest
///
/// Input payload for `POST /leave-requests`. Validated by `academics::validate_leave`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NewLeaveRequest {
    #[serde(rename = "type")]
    pub kind: LeaveKind,
    #[ts(type = "string")]
    pub from_date: NaiveDate,
    #[ts(type = "string")]
    pub to_date: NaiveDate,
    pub reason: String,
    /// Names of supporting documents.
    #[serde(default)]
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NewReevaluationRequest {
    pub course_id: String,
    pub exam_type: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub target: AnnouncementTarget,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct WorkflowStatusRequest {
    pub status: WorkflowStatus,
}

// --- Academic Records ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    pub credits: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AssignmentStatus {
    Pending,
    Submitted,
    Graded,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub course_id: String,
    pub course_name: String,
    #[ts(type = "string")]
    pub deadline: NaiveDateTime,
    pub status: AssignmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<u32>,
    pub total_marks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub submitted_at: Option<NaiveDateTime>,
}

/// A graded course in a student's semester history (used by the CGPA calculator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct GradedCourse {
    pub code: String,
    pub name: String,
    pub credits: u8,
    /// Letter grade, or `IP` while the course is in progress.
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SemesterRecord {
    pub semester: u8,
    pub courses: Vec<GradedCourse>,
}

// --- Notifications ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Notification
///
/// A single in-app notification. `kind` is sent as `type` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[ts(type = "string")]
    pub timestamp: NaiveDateTime,
    pub read: bool,
}

// --- Requests (Leave & Re-evaluation) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LeaveKind {
    Medical,
    Personal,
    Academic,
    Family,
}

impl LeaveKind {
    pub const ALL: [LeaveKind; 4] = [
        LeaveKind::Medical,
        LeaveKind::Personal,
        LeaveKind::Academic,
        LeaveKind::Family,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LeaveKind::Medical => "Medical Leave",
            LeaveKind::Personal => "Personal Leave",
            LeaveKind::Academic => "Academic Leave",
            LeaveKind::Family => "Family Emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LeaveRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LeaveKind,
    #[ts(type = "string")]
    pub from_date: NaiveDate,
    #[ts(type = "string")]
    pub to_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    #[serde(default)]
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ReevaluationStatus {
    Pending,
    UnderReview,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ReevaluationRequest {
    pub id: String,
    pub course_id: String,
    pub course_name: String,
    pub exam_type: String,
    pub reason: String,
    pub status: ReevaluationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_grade: Option<String>,
}

// --- Administration ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum WorkflowStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum StepKind {
    Approval,
    Task,
    Notification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct WorkflowStep {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Service-level target in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: WorkflowStatus,
    pub steps: Vec<WorkflowStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AnnouncementTarget {
    All,
    Students,
    Faculty,
    Department,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub target: AnnouncementTarget,
    pub priority: Priority,
    #[ts(type = "string")]
    pub published_at: NaiveDateTime,
    pub author: String,
}

impl Announcement {
    /// Whether an identity with `role` should see this announcement.
    /// Admins see everything; department notices reach every role.
    pub fn visible_to(&self, role: Role) -> bool {
        match (self.target, role) {
            (_, Role::Admin) => true,
            (AnnouncementTarget::All | AnnouncementTarget::Department, _) => true,
            (AnnouncementTarget::Students, Role::Student) => true,
            (AnnouncementTarget::Faculty, Role::Faculty) => true,
            _ => false,
        }
    }
}

/// SystemStats
///
/// Output schema for the administrative statistics dashboard (GET /admin/stats).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SystemStats {
    pub total_users: u32,
    pub active_students: u32,
    pub active_faculty: u32,
    pub admin_staff: u32,
    pub active_workflows: u32,
    pub pending_approvals: u32,
    pub system_health: f64,
    pub uptime: String,
    pub cpu_usage: u8,
    pub memory_usage: u8,
    pub disk_usage: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Activity {
    pub id: String,
    pub user: String,
    pub action: String,
    pub target: String,
    #[ts(type = "string")]
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AlertKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SystemAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    #[ts(type = "string")]
    pub timestamp: NaiveDateTime,
}

// --- Faculty Workload ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PendingReview {
    pub id: String,
    pub student_name: String,
    pub assignment_title: String,
    pub course_name: String,
    #[ts(type = "string")]
    pub submitted_at: NaiveDateTime,
    #[ts(type = "string")]
    pub deadline: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FacultyTask {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[ts(type = "string")]
    pub due_date: NaiveDate,
    pub completed: bool,
}

/// A read-only summary of a directory account for the user-management view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DirectoryEntry {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl From<&Identity> for DirectoryEntry {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role(),
            department: identity.department.clone(),
        }
    }
}
