use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    AdminProfile, Course, FacultyProfile, Identity, RoleProfile, normalize_email,
};

/// LocalRoleDirectory
///
/// Static, read-only stand-in for a faculty/admin directory service. Presence in
/// the map plus a matching role is what "authenticates" these accounts; no
/// password is modelled.
///
/// It also carries the student-reserved email set, so faculty/admin sign-in can
/// refuse an address that belongs to the student category without asking the
/// identity store.
#[derive(Debug, Clone, Default)]
pub struct LocalRoleDirectory {
    accounts: BTreeMap<String, Identity>,
    reserved_students: BTreeSet<String>,
}

impl LocalRoleDirectory {
    /// Builds a directory from identities and student-reserved emails.
    /// Emails are normalized on the way in.
    pub fn new(
        accounts: impl IntoIterator<Item = Identity>,
        reserved_students: impl IntoIterator<Item = String>,
    ) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|mut identity| {
                identity.email = normalize_email(&identity.email);
                (identity.email.clone(), identity)
            })
            .collect();
        let reserved_students = reserved_students
            .into_iter()
            .map(|email| normalize_email(&email))
            .collect();
        Self {
            accounts,
            reserved_students,
        }
    }

    /// The university's faculty and admin accounts.
    pub fn seeded() -> Self {
        Self::new(
            [seed_faculty(), seed_admin()],
            ["student@university.edu".to_string()],
        )
    }

    pub fn lookup(&self, email: &str) -> Option<Identity> {
        self.accounts.get(&normalize_email(email)).cloned()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.accounts.contains_key(&normalize_email(email))
    }

    pub fn is_student_reserved(&self, email: &str) -> bool {
        self.reserved_students.contains(&normalize_email(email))
    }

    /// All directory accounts, ordered by email.
    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.accounts.values()
    }
}

fn seed_faculty() -> Identity {
    Identity {
        id: "FAC001".to_string(),
        email: "faculty@university.edu".to_string(),
        name: "Dr. Debrup Das".to_string(),
        avatar: Some("https://api.dicebear.com/9.x/dylan/svg?seed=Sarah".to_string()),
        department: Some("Computer Science".to_string()),
        institution: Some("Tech University".to_string()),
        profile: RoleProfile::Faculty(FacultyProfile {
            employee_id: "EMP2015001".to_string(),
            designation: "Associate Professor".to_string(),
            courses: vec![
                Course {
                    id: "CSE301".to_string(),
                    code: "CSE301".to_string(),
                    name: "Data Structures".to_string(),
                    credits: 4,
                    ..Course::default()
                },
                Course {
                    id: "CSE304".to_string(),
                    code: "CSE304".to_string(),
                    name: "Algorithms".to_string(),
                    credits: 4,
                    ..Course::default()
                },
            ],
        }),
    }
}

fn seed_admin() -> Identity {
    Identity {
        id: "ADM001".to_string(),
        email: "admin@university.edu".to_string(),
        name: "Arijit Sen".to_string(),
        avatar: Some("https://api.dicebear.com/9.x/dylan/svg?seed=Michael".to_string()),
        department: Some("Administration".to_string()),
        institution: Some("Tech University".to_string()),
        profile: RoleProfile::Admin(AdminProfile {
            employee_id: "EMP2010001".to_string(),
            permissions: vec![
                "users.manage".to_string(),
                "workflows.configure".to_string(),
                "system.monitor".to_string(),
                "announcements.publish".to_string(),
            ],
        }),
    }
}
