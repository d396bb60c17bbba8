use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};
use uniadmin_portal::{
    AppConfig, AppState, InMemoryRepository,
    auth::{Claims, CurrentUser, decode_access_token},
    error::{AuthError, PortalError},
    identity_store::MockIdentityStore,
    models::Role,
};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn create_token(secret: &str, exp: u64) -> String {
    let claims = Claims {
        sub: TEST_USER_ID,
        email: Some("student@university.edu".to_string()),
        iat: now() as usize,
        exp: exp as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state() -> AppState {
    AppState::new(
        Arc::new(MockIdentityStore::demo()),
        Arc::new(InMemoryRepository::seeded()),
        AppConfig::default(),
    )
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- Access token validation ---

#[test]
fn test_decode_valid_token() {
    let token = create_token(TEST_JWT_SECRET, now() + 3600);

    let claims = decode_access_token(&token, TEST_JWT_SECRET).expect("token should validate");

    assert_eq!(claims.sub, TEST_USER_ID);
    assert_eq!(claims.email.as_deref(), Some("student@university.edu"));
}

#[test]
fn test_decode_expired_token() {
    // Well past the default validation leeway.
    let token = create_token(TEST_JWT_SECRET, now() - 3600);

    assert_eq!(
        decode_access_token(&token, TEST_JWT_SECRET).unwrap_err(),
        AuthError::InvalidCredentials
    );
}

#[test]
fn test_decode_wrong_secret() {
    let token = create_token("some-other-project-secret", now() + 3600);

    assert!(decode_access_token(&token, TEST_JWT_SECRET).is_err());
}

#[test]
fn test_decode_garbage() {
    assert!(decode_access_token("not-a-jwt", TEST_JWT_SECRET).is_err());
}

// --- CurrentUser extractor ---

#[tokio::test]
async fn test_current_user_rejected_while_anonymous() {
    let app_state = create_app_state();
    let mut parts = get_request_parts(Method::GET, "/me".parse().unwrap());

    let user = CurrentUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(user.unwrap_err(), PortalError::NotAuthenticated);
}

#[tokio::test]
async fn test_current_user_after_login() {
    let app_state = create_app_state();
    app_state
        .session
        .login("faculty@university.edu", "", Role::Faculty)
        .await
        .unwrap();

    let mut parts = get_request_parts(Method::GET, "/me".parse().unwrap());
    let user = CurrentUser::from_request_parts(&mut parts, &app_state)
        .await
        .expect("signed-in session should extract");

    assert_eq!(user.0.id, "FAC001");
    assert_eq!(user.0.role(), Role::Faculty);
}

#[tokio::test]
async fn test_current_user_cleared_by_logout() {
    let app_state = create_app_state();
    app_state
        .session
        .login("student@university.edu", "student123", Role::Student)
        .await
        .unwrap();
    app_state.session.logout().await;

    let mut parts = get_request_parts(Method::GET, "/me".parse().unwrap());
    let user = CurrentUser::from_request_parts(&mut parts, &app_state).await;

    assert!(user.is_err());
}

#[tokio::test]
async fn test_require_role_is_fail_closed() {
    let app_state = create_app_state();
    let admin = app_state
        .session
        .login("admin@university.edu", "", Role::Admin)
        .await
        .unwrap();
    let user = CurrentUser(admin);

    assert!(user.require_role(Role::Admin).is_ok());
    assert_eq!(
        user.require_role(Role::Student).unwrap_err(),
        PortalError::Forbidden
    );
    assert_eq!(
        user.require_role(Role::Faculty).unwrap_err(),
        PortalError::Forbidden
    );
}
