use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::Role;

pub const DEFAULT_PATH: &str = "/dashboard";

// --- View Identifiers ---

/// ViewId
///
/// Every screen the portal knows about. The wire form is the path segment,
/// e.g. `cgpa-calculator` for `/cgpa-calculator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum ViewId {
    Login,
    Dashboard,
    Profile,
    Courses,
    Assignments,
    SubmitAssignment,
    Reevaluation,
    Attendance,
    LeaveRequest,
    ViewAttendance,
    Notifications,
    CgpaCalculator,
    Review,
    Users,
    Workflows,
    Monitor,
    Announcements,
    Settings,
}

/// What happens when a signed-in role requests a view outside its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialPolicy {
    /// Render a placeholder carrying the view's title and description.
    Placeholder,
    /// Render the requesting role's own dashboard.
    OwnDashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewMeta {
    pub title: &'static str,
    pub description: &'static str,
    pub denial: DenialPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown view: {0}")]
pub struct UnknownView(pub String);

impl ViewId {
    pub const ALL: [ViewId; 18] = [
        ViewId::Login,
        ViewId::Dashboard,
        ViewId::Profile,
        ViewId::Courses,
        ViewId::Assignments,
        ViewId::SubmitAssignment,
        ViewId::Reevaluation,
        ViewId::Attendance,
        ViewId::LeaveRequest,
        ViewId::ViewAttendance,
        ViewId::Notifications,
        ViewId::CgpaCalculator,
        ViewId::Review,
        ViewId::Users,
        ViewId::Workflows,
        ViewId::Monitor,
        ViewId::Announcements,
        ViewId::Settings,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ViewId::Login => "login",
            ViewId::Dashboard => "dashboard",
            ViewId::Profile => "profile",
            ViewId::Courses => "courses",
            ViewId::Assignments => "assignments",
            ViewId::SubmitAssignment => "submit-assignment",
            ViewId::Reevaluation => "reevaluation",
            ViewId::Attendance => "attendance",
            ViewId::LeaveRequest => "leave-request",
            ViewId::ViewAttendance => "view-attendance",
            ViewId::Notifications => "notifications",
            ViewId::CgpaCalculator => "cgpa-calculator",
            ViewId::Review => "review",
            ViewId::Users => "users",
            ViewId::Workflows => "workflows",
            ViewId::Monitor => "monitor",
            ViewId::Announcements => "announcements",
            ViewId::Settings => "settings",
        }
    }

    pub fn path(&self) -> String {
        format!("/{}", self.slug())
    }

    /// Parses `/cgpa-calculator` or `cgpa-calculator`.
    pub fn from_path(path: &str) -> Option<ViewId> {
        let slug = path.trim().trim_start_matches('/');
        ViewId::ALL.into_iter().find(|view| view.slug() == slug)
    }

    pub fn meta(&self) -> ViewMeta {
        use DenialPolicy::{OwnDashboard, Placeholder};
        let (title, description, denial) = match self {
            ViewId::Login => ("Sign In", "Sign in to the portal.", OwnDashboard),
            ViewId::Dashboard => ("Dashboard", "Your overview at a glance.", OwnDashboard),
            ViewId::Profile => ("My Profile", "View and manage your personal information.", Placeholder),
            ViewId::Courses => ("Course Management", "Manage your courses and materials.", Placeholder),
            ViewId::Assignments => (
                "Assignments",
                "Create, manage, and grade student assignments.",
                Placeholder,
            ),
            ViewId::SubmitAssignment => (
                "Submit Assignment",
                "Upload your work before the deadline.",
                OwnDashboard,
            ),
            ViewId::Reevaluation => (
                "Exam Re-evaluation",
                "Request a re-evaluation of your exam results.",
                OwnDashboard,
            ),
            ViewId::Attendance => ("Attendance", "Mark and manage student attendance.", Placeholder),
            ViewId::LeaveRequest => ("Leave Request", "Apply for leave and track your requests.", OwnDashboard),
            ViewId::ViewAttendance => ("View Attendance", "Track your attendance across courses.", OwnDashboard),
            ViewId::Notifications => (
                "Notifications",
                "View all notifications and announcements.",
                Placeholder,
            ),
            ViewId::CgpaCalculator => ("CGPA Calculator", "Track your academic performance.", OwnDashboard),
            ViewId::Review => (
                "Review Assignments",
                "Review and grade student assignment submissions.",
                OwnDashboard,
            ),
            ViewId::Users => (
                "User Management",
                "Onboard new users, manage roles and permissions.",
                OwnDashboard,
            ),
            ViewId::Workflows => (
                "Workflow Configuration",
                "Configure and manage administrative workflows.",
                OwnDashboard,
            ),
            ViewId::Monitor => (
                "System Monitoring",
                "Monitor system performance and manage alerts.",
                OwnDashboard,
            ),
            ViewId::Announcements => ("Announcements", "Create and publish announcements.", OwnDashboard),
            ViewId::Settings => (
                "System Settings",
                "Configure system settings and integrations.",
                OwnDashboard,
            ),
        };
        ViewMeta {
            title,
            description,
            denial,
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ViewId {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewId::from_path(s).ok_or_else(|| UnknownView(s.to_string()))
    }
}

// --- Permission Table ---

/// The views each role may open directly.
pub fn permitted_views(role: Role) -> &'static [ViewId] {
    match role {
        Role::Student => &[
            ViewId::Dashboard,
            ViewId::Profile,
            ViewId::Courses,
            ViewId::Assignments,
            ViewId::SubmitAssignment,
            ViewId::Reevaluation,
            ViewId::Attendance,
            ViewId::LeaveRequest,
            ViewId::ViewAttendance,
            ViewId::Notifications,
            ViewId::CgpaCalculator,
        ],
        Role::Faculty => &[ViewId::Dashboard, ViewId::Review],
        Role::Admin => &[
            ViewId::Dashboard,
            ViewId::Users,
            ViewId::Workflows,
            ViewId::Monitor,
            ViewId::Announcements,
            ViewId::Settings,
        ],
    }
}

pub fn is_permitted(role: Role, view: ViewId) -> bool {
    permitted_views(role).contains(&view)
}

// --- Route Authorizer ---

/// Resolution
///
/// The outcome of a navigation request. Navigation never denies; data
/// endpoints enforce roles on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Resolution {
    Login,
    Granted {
        view: ViewId,
    },
    Fallback {
        requested: String,
        view: ViewId,
    },
    Placeholder {
        requested: String,
        title: String,
        description: String,
    },
}

impl Resolution {
    /// The view that is actually rendered.
    pub fn view(&self) -> Option<ViewId> {
        match self {
            Resolution::Login => Some(ViewId::Login),
            Resolution::Granted { view } | Resolution::Fallback { view, .. } => Some(*view),
            Resolution::Placeholder { .. } => None,
        }
    }

    /// The sidebar entry to highlight for this resolution.
    pub fn active_path(&self) -> String {
        match self {
            Resolution::Login => ViewId::Login.path(),
            Resolution::Granted { view } | Resolution::Fallback { view, .. } => view.path(),
            Resolution::Placeholder { requested, .. } => requested.clone(),
        }
    }
}

/// authorize
///
/// Total function from (role, view) to a resolution:
/// 1. anonymous: `Login`,
/// 2. view in the role's table: `Granted`,
/// 3. otherwise the view's denial policy picks `Fallback` (own dashboard) or `Placeholder`.
pub fn authorize(role: Option<Role>, view: ViewId) -> Resolution {
    let Some(role) = role else {
        return Resolution::Login;
    };

    if is_permitted(role, view) {
        return Resolution::Granted { view };
    }

    let meta = view.meta();
    match meta.denial {
        DenialPolicy::OwnDashboard => Resolution::Fallback {
            requested: view.path(),
            view: ViewId::Dashboard,
        },
        DenialPolicy::Placeholder => Resolution::Placeholder {
            requested: view.path(),
            title: meta.title.to_string(),
            description: meta.description.to_string(),
        },
    }
}

/// Like `authorize`, for a raw path. Unknown paths fall back to the dashboard.
pub fn authorize_path(role: Option<Role>, path: &str) -> Resolution {
    match (ViewId::from_path(path), role) {
        (Some(view), _) => authorize(role, view),
        (None, None) => Resolution::Login,
        (None, Some(_)) => Resolution::Fallback {
            requested: normalize_path(path),
            view: ViewId::Dashboard,
        },
    }
}

fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}

// --- Navigator ---

/// Navigator
///
/// In-memory navigation state: the last requested path. Nothing is persisted;
/// a new process starts on the dashboard.
#[derive(Debug)]
pub struct Navigator {
    current: RwLock<String>,
}

pub type NavigatorState = Arc<Navigator>;

impl Default for Navigator {
    fn default() -> Self {
        Self {
            current: RwLock::new(DEFAULT_PATH.to_string()),
        }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path` as the current location and returns it normalized.
    pub async fn navigate(&self, path: &str) -> String {
        let path = normalize_path(path);
        *self.current.write().await = path.clone();
        tracing::debug!(path = %path, "navigated");
        path
    }

    pub async fn reset(&self) {
        *self.current.write().await = DEFAULT_PATH.to_string();
    }

    pub async fn current(&self) -> String {
        self.current.read().await.clone()
    }
}

// --- Sidebar Menu ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavItem {
    pub label: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schema(no_recursion)]
    pub children: Vec<NavItem>,
}

impl NavItem {
    fn leaf(label: &str, view: ViewId) -> Self {
        Self {
            label: label.to_string(),
            path: view.path(),
            children: Vec::new(),
        }
    }

    fn with_children(label: &str, view: ViewId, children: Vec<NavItem>) -> Self {
        Self {
            children,
            ..Self::leaf(label, view)
        }
    }
}

/// Sidebar menu for a role. Faculty entries outside their table resolve to
/// placeholders.
pub fn navigation_for(role: Role) -> Vec<NavItem> {
    match role {
        Role::Student => vec![
            NavItem::leaf("Dashboard", ViewId::Dashboard),
            NavItem::leaf("My Profile", ViewId::Profile),
            NavItem::leaf("Assignments", ViewId::Assignments),
            NavItem::with_children(
                "Attendance",
                ViewId::ViewAttendance,
                vec![NavItem::leaf("Leave Request", ViewId::LeaveRequest)],
            ),
            NavItem::leaf("CGPA Calculator", ViewId::CgpaCalculator),
            NavItem::leaf("Re-evaluation", ViewId::Reevaluation),
            NavItem::leaf("Notifications", ViewId::Notifications),
        ],
        Role::Faculty => vec![
            NavItem::leaf("Dashboard", ViewId::Dashboard),
            NavItem::leaf("My Profile", ViewId::Profile),
            NavItem::leaf("My Courses", ViewId::Courses),
            NavItem::leaf("Review Assignments", ViewId::Review),
            NavItem::leaf("Mark Attendance", ViewId::Attendance),
            NavItem::leaf("Notifications", ViewId::Notifications),
        ],
        Role::Admin => vec![
            NavItem::leaf("Dashboard", ViewId::Dashboard),
            NavItem::leaf("User Management", ViewId::Users),
            NavItem::leaf("Workflows", ViewId::Workflows),
            NavItem::leaf("System Monitor", ViewId::Monitor),
            NavItem::leaf("Announcements", ViewId::Announcements),
            NavItem::leaf("Settings", ViewId::Settings),
        ],
    }
}
