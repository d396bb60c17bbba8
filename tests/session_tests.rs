use std::{sync::Arc, time::Duration};
use uniadmin_portal::{
    IdentityStoreState, LocalRoleDirectory, SessionManager, UnconfiguredIdentityStore,
    error::AuthError,
    identity_store::{MockIdentityStore, SessionToken, StudentProfileRecord, demo_student_record},
    models::{ProfilePatch, Role, RoleProfile, UpdateUserRequest},
    session::SessionStatus,
};
use uuid::Uuid;

// --- Helpers ---

fn manager_with(store: Arc<MockIdentityStore>) -> Arc<SessionManager> {
    Arc::new(SessionManager::new(
        store as IdentityStoreState,
        Arc::new(LocalRoleDirectory::seeded()),
    ))
}

fn second_student() -> StudentProfileRecord {
    StudentProfileRecord {
        id: "STU002".to_string(),
        email: "priya@university.edu".to_string(),
        name: "Priya Nair".to_string(),
        roll_number: "CS2021042".to_string(),
        semester: 4,
        cgpa: 9.1,
        attendance: 72.0,
        courses: Vec::new(),
        ..demo_student_record()
    }
}

// --- Login: student path ---

#[tokio::test]
async fn test_student_login_returns_student_identity() {
    let session = manager_with(Arc::new(MockIdentityStore::demo()));

    let identity = session
        .login("student@university.edu", "student123", Role::Student)
        .await
        .expect("demo student should sign in");

    assert_eq!(identity.role(), Role::Student);
    assert_eq!(identity.name, "Ankit Sarkar");
    assert_eq!(session.current().await, Some(identity));
    assert_eq!(session.status().await, SessionStatus::Authenticated);
}

#[tokio::test]
async fn test_student_login_normalizes_email() {
    let session = manager_with(Arc::new(MockIdentityStore::demo()));

    let identity = session
        .login("  Student@University.EDU ", "student123", Role::Student)
        .await
        .unwrap();

    assert_eq!(identity.email, "student@university.edu");
}

#[tokio::test]
async fn test_student_wrong_password_is_invalid_credentials() {
    let session = manager_with(Arc::new(MockIdentityStore::demo()));

    let result = session
        .login("student@university.edu", "wrong", Role::Student)
        .await;

    assert_eq!(result, Err(AuthError::InvalidCredentials));
    assert_eq!(session.current().await, None);
}

#[tokio::test]
async fn test_student_without_profile_row_fails_and_invalidates() {
    let store = Arc::new(
        MockIdentityStore::new().with_account_without_profile("ghost@university.edu", "pw"),
    );
    let session = manager_with(store.clone());

    let result = session
        .login("ghost@university.edu", "pw", Role::Student)
        .await;

    assert_eq!(result, Err(AuthError::ProfileNotFound));
    assert_eq!(session.status().await, SessionStatus::Anonymous);
    assert_eq!(store.invalidation_calls(), 1);
    assert!(!store.has_session().await);
}

#[tokio::test]
async fn test_failed_profile_lookup_leaves_nothing_to_restore() {
    let store = Arc::new(MockIdentityStore::demo().failing_profile_lookup());
    let session = manager_with(store.clone());

    let result = session
        .login("student@university.edu", "student123", Role::Student)
        .await;

    assert!(matches!(result, Err(AuthError::TransientNetworkFailure(_))));
    assert_eq!(store.invalidation_calls(), 1);
    assert!(!store.has_session().await);

    // A restart over the same store finds no session to pick up.
    let restarted = manager_with(store);
    assert_eq!(restarted.restore_session().await, None);
    assert_eq!(restarted.status().await, SessionStatus::Anonymous);
}

#[tokio::test]
async fn test_staff_login_ends_replaced_student_session() {
    let store = Arc::new(MockIdentityStore::demo());
    let session = manager_with(store.clone());
    session
        .login("student@university.edu", "student123", Role::Student)
        .await
        .unwrap();
    assert!(store.has_session().await);

    session
        .login("admin@university.edu", "", Role::Admin)
        .await
        .unwrap();

    assert_eq!(store.invalidation_calls(), 1);
    assert!(!store.has_session().await);
    let restarted = manager_with(store);
    assert_eq!(restarted.restore_session().await, None);
}

#[tokio::test]
async fn test_directory_email_cannot_sign_in_as_student() {
    let store = Arc::new(MockIdentityStore::demo());
    let session = manager_with(store);

    let result = session
        .login("faculty@university.edu", "anything", Role::Student)
        .await;

    assert_eq!(result, Err(AuthError::RoleNotAllowed(Role::Student)));
}

#[tokio::test]
async fn test_store_outage_is_transient_failure() {
    let session = manager_with(Arc::new(MockIdentityStore::demo().unavailable()));

    let result = session
        .login("student@university.edu", "student123", Role::Student)
        .await;

    assert!(matches!(result, Err(AuthError::TransientNetworkFailure(_))));
}

#[tokio::test]
async fn test_unconfigured_store_surfaces_configuration_error() {
    let session = SessionManager::new(
        Arc::new(UnconfiguredIdentityStore::new("SUPABASE_URL")) as IdentityStoreState,
        Arc::new(LocalRoleDirectory::seeded()),
    );

    let student = session
        .login("someone@university.edu", "pw", Role::Student)
        .await;
    assert_eq!(student, Err(AuthError::ConfigurationMissing("SUPABASE_URL")));

    // Directory sign-in does not depend on the identity store.
    let admin = session
        .login("admin@university.edu", "", Role::Admin)
        .await;
    assert!(admin.is_ok());
}

// --- Login: directory path ---

#[tokio::test]
async fn test_admin_login_with_any_password() {
    let session = manager_with(Arc::new(MockIdentityStore::new()));

    let identity = session
        .login("admin@university.edu", "whatever", Role::Admin)
        .await
        .unwrap();

    assert_eq!(identity.role(), Role::Admin);
    assert!(!identity.permissions().is_empty());
    assert!(identity.has_permission("announcements.publish"));
}

#[tokio::test]
async fn test_faculty_login_carries_courses() {
    let session = manager_with(Arc::new(MockIdentityStore::new()));

    let identity = session
        .login("faculty@university.edu", "", Role::Faculty)
        .await
        .unwrap();

    match &identity.profile {
        RoleProfile::Faculty(faculty) => {
            assert_eq!(faculty.designation, "Associate Professor");
            assert_eq!(faculty.courses.len(), 2);
        }
        other => panic!("expected faculty profile, got {other:?}"),
    }
}

#[tokio::test]
async fn test_directory_email_with_mismatched_role_is_account_not_found() {
    let session = manager_with(Arc::new(MockIdentityStore::new()));

    let result = session
        .login("faculty@university.edu", "pw", Role::Admin)
        .await;

    assert_eq!(result, Err(AuthError::AccountNotFound));
}

#[tokio::test]
async fn test_unknown_faculty_email_is_account_not_found() {
    let session = manager_with(Arc::new(MockIdentityStore::new()));

    let result = session.login("unknown@x.com", "pw", Role::Faculty).await;

    assert_eq!(result, Err(AuthError::AccountNotFound));
}

#[tokio::test]
async fn test_student_email_cannot_sign_in_as_staff() {
    let session = manager_with(Arc::new(MockIdentityStore::demo()));

    for role in [Role::Faculty, Role::Admin] {
        let result = session
            .login("student@university.edu", "student123", role)
            .await;
        assert_eq!(result, Err(AuthError::RoleNotAllowed(role)));
    }
}

#[tokio::test]
async fn test_store_student_outside_directory_cannot_sign_in_as_staff() {
    let store = Arc::new(MockIdentityStore::demo().with_student("priya-pass", second_student()));
    let session = manager_with(store);

    session
        .login("priya@university.edu", "priya-pass", Role::Student)
        .await
        .unwrap();
    session.logout().await;

    for role in [Role::Faculty, Role::Admin] {
        let result = session.login("Priya@University.edu", "", role).await;
        assert_eq!(result, Err(AuthError::RoleNotAllowed(role)));
    }
    assert_eq!(session.current().await, None);
}

#[tokio::test]
async fn test_staff_login_with_store_outage_is_account_not_found() {
    let session = manager_with(Arc::new(MockIdentityStore::demo().unavailable()));

    let unknown = session.login("visitor@university.edu", "", Role::Faculty).await;
    let faculty = session.login("faculty@university.edu", "", Role::Faculty).await;

    assert_eq!(unknown, Err(AuthError::AccountNotFound));
    assert_eq!(faculty.unwrap().role(), Role::Faculty);
}

#[tokio::test]
async fn test_failed_login_keeps_previous_identity() {
    let session = manager_with(Arc::new(MockIdentityStore::new()));
    session
        .login("admin@university.edu", "", Role::Admin)
        .await
        .unwrap();

    let _ = session.login("unknown@x.com", "pw", Role::Faculty).await;

    assert_eq!(session.current_role().await, Some(Role::Admin));
}

#[tokio::test]
async fn test_last_login_overwrites() {
    let session = manager_with(Arc::new(MockIdentityStore::demo()));

    session
        .login("admin@university.edu", "", Role::Admin)
        .await
        .unwrap();
    session
        .login("student@university.edu", "student123", Role::Student)
        .await
        .unwrap();

    assert_eq!(session.current_role().await, Some(Role::Student));
}

// --- Concurrency ---

#[tokio::test]
async fn test_status_is_authenticating_while_login_in_flight() {
    let store = MockIdentityStore::demo()
        .with_latency("student@university.edu", Duration::from_millis(200));
    let session = manager_with(Arc::new(store));

    let pending = {
        let session = session.clone();
        tokio::spawn(async move {
            session
                .login("student@university.edu", "student123", Role::Student)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.status().await, SessionStatus::Authenticating);

    pending.await.unwrap().unwrap();
    assert_eq!(session.status().await, SessionStatus::Authenticated);
}

#[tokio::test]
async fn test_concurrent_logins_last_completed_wins() {
    let store = MockIdentityStore::demo()
        .with_student("priya-pass", second_student())
        .with_latency("student@university.edu", Duration::from_millis(150));
    let session = manager_with(Arc::new(store));

    // The slow login starts first but completes last.
    let slow = {
        let session = session.clone();
        tokio::spawn(async move {
            session
                .login("student@university.edu", "student123", Role::Student)
                .await
        })
    };
    let fast = {
        let session = session.clone();
        tokio::spawn(async move {
            session
                .login("priya@university.edu", "priya-pass", Role::Student)
                .await
        })
    };

    let fast_identity = fast.await.unwrap().unwrap();
    assert_eq!(session.current().await, Some(fast_identity));

    let slow_identity = slow.await.unwrap().unwrap();
    let current = session.current().await.unwrap();

    // A whole Identity from one login, never a mix of both.
    assert_eq!(current, slow_identity);
    assert_eq!(current.id, "STU001");
    assert_eq!(current.as_student().unwrap().roll_number, "CS2021001");
}

// --- Logout ---

#[tokio::test]
async fn test_logout_clears_session() {
    let store = Arc::new(MockIdentityStore::demo());
    let session = manager_with(store.clone());
    session
        .login("student@university.edu", "student123", Role::Student)
        .await
        .unwrap();

    session.logout().await;

    assert_eq!(session.current().await, None);
    assert_eq!(session.status().await, SessionStatus::Anonymous);
    assert!(!store.has_session().await);
}

#[tokio::test]
async fn test_logout_succeeds_when_invalidation_fails() {
    let store = Arc::new(MockIdentityStore::demo().failing_invalidation());
    let session = manager_with(store.clone());
    session
        .login("student@university.edu", "student123", Role::Student)
        .await
        .unwrap();

    session.logout().await;

    assert_eq!(store.invalidation_calls(), 1);
    assert_eq!(session.current().await, None);
}

#[tokio::test]
async fn test_logout_while_anonymous_is_harmless() {
    let session = manager_with(Arc::new(MockIdentityStore::new()));
    session.logout().await;
    assert_eq!(session.status().await, SessionStatus::Anonymous);
}

// --- Update ---

#[tokio::test]
async fn test_update_user_while_anonymous_is_noop() {
    let session = manager_with(Arc::new(MockIdentityStore::new()));

    let result = session
        .update_user(UpdateUserRequest {
            name: Some("Nobody".to_string()),
            ..Default::default()
        })
        .await;

    assert_eq!(result, Ok(None));
    assert_eq!(session.current().await, None);
}

#[tokio::test]
async fn test_update_user_merges_fields() {
    let session = manager_with(Arc::new(MockIdentityStore::demo()));
    session
        .login("student@university.edu", "student123", Role::Student)
        .await
        .unwrap();

    let updated = session
        .update_user(UpdateUserRequest {
            name: Some("Ankit S.".to_string()),
            profile: Some(ProfilePatch::Student {
                program: None,
                semester: Some(7),
            }),
            ..Default::default()
        })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Ankit S.");
    let student = updated.as_student().unwrap();
    assert_eq!(student.semester, 7);
    // Untouched fields survive the merge.
    assert_eq!(student.program, "B.Tech Computer Science");
    assert_eq!(session.current().await, Some(updated));
}

#[tokio::test]
async fn test_update_user_rejects_role_change() {
    let session = manager_with(Arc::new(MockIdentityStore::demo()));
    let before = session
        .login("student@university.edu", "student123", Role::Student)
        .await
        .unwrap();

    let result = session
        .update_user(UpdateUserRequest {
            name: Some("Sneaky".to_string()),
            role: Some(Role::Admin),
            ..Default::default()
        })
        .await;

    assert_eq!(result, Err(AuthError::RoleImmutable));
    assert_eq!(session.current().await, Some(before));
}

#[tokio::test]
async fn test_update_user_rejects_foreign_profile_fields() {
    let session = manager_with(Arc::new(MockIdentityStore::demo()));
    session
        .login("student@university.edu", "student123", Role::Student)
        .await
        .unwrap();

    let result = session
        .update_user(UpdateUserRequest {
            profile: Some(ProfilePatch::Faculty {
                designation: Some("Professor".to_string()),
            }),
            ..Default::default()
        })
        .await;

    assert_eq!(result, Err(AuthError::ProfileMismatch));
    assert!(session.current().await.unwrap().as_student().is_some());
}

#[tokio::test]
async fn test_snapshot_agrees_with_slot() {
    let session = manager_with(Arc::new(MockIdentityStore::demo()));

    let anonymous = session.snapshot().await;
    assert_eq!(anonymous.status, SessionStatus::Anonymous);
    assert!(anonymous.identity.is_none());

    session
        .login("faculty@university.edu", "", Role::Faculty)
        .await
        .unwrap();
    let signed_in = session.snapshot().await;
    assert_eq!(signed_in.status, SessionStatus::Authenticated);
    assert_eq!(signed_in.identity.unwrap().role(), Role::Faculty);
}

// --- Restore ---

#[tokio::test]
async fn test_restore_without_prior_session_stays_anonymous() {
    let session = manager_with(Arc::new(MockIdentityStore::demo()));

    assert_eq!(session.restore_session().await, None);
    assert_eq!(session.status().await, SessionStatus::Anonymous);
}

#[tokio::test]
async fn test_restore_picks_up_existing_session() {
    let store = MockIdentityStore::demo().with_session(SessionToken {
        access_token: "token".to_string(),
        user_id: Uuid::new_v4(),
        email: "student@university.edu".to_string(),
        expires_at: None,
    });
    let session = manager_with(Arc::new(store));

    let restored = session.restore_session().await.expect("session should restore");

    assert_eq!(restored.id, "STU001");
    assert_eq!(session.current().await, Some(restored));
}

#[tokio::test]
async fn test_restore_failure_is_swallowed() {
    let session = manager_with(Arc::new(MockIdentityStore::demo().unavailable()));

    assert_eq!(session.restore_session().await, None);
    assert_eq!(session.current().await, None);
}

#[tokio::test]
async fn test_restore_does_not_clobber_completed_login() {
    let store = MockIdentityStore::demo().with_session(SessionToken {
        access_token: "token".to_string(),
        user_id: Uuid::new_v4(),
        email: "student@university.edu".to_string(),
        expires_at: None,
    });
    let session = manager_with(Arc::new(store));
    session
        .login("admin@university.edu", "", Role::Admin)
        .await
        .unwrap();

    assert_eq!(session.restore_session().await, None);
    assert_eq!(session.current_role().await, Some(Role::Admin));
}
