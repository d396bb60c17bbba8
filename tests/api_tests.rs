use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use uniadmin_portal::{
    AppConfig, AppState, IdentityStoreState, InMemoryRepository, create_router,
    identity_store::MockIdentityStore, repository::RepositoryState,
};

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn login(&self, email: &str, password: &str, role: &str) -> reqwest::Response {
        self.client
            .post(self.url("/session/login"))
            .json(&json!({ "email": email, "password": password, "role": role }))
            .send()
            .await
            .expect("req fail")
    }
}

async fn spawn_app() -> TestApp {
    let store = Arc::new(MockIdentityStore::demo()) as IdentityStoreState;
    let repo = Arc::new(InMemoryRepository::seeded()) as RepositoryState;
    let state = AppState::new(store, repo, AppConfig::default());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_health_reports_identity_store_configuration() {
    let app = spawn_app().await;
    let health: Value = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("req fail")
        .json()
        .await
        .unwrap();

    assert_eq!(health["status"], "ok");
    assert_eq!(health["environment"], "local");
    // The default config carries no Supabase secrets.
    assert!(health["identity_store"].as_str().unwrap().contains("SUPABASE_URL"));
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("req fail");
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let doc: Value = app
        .client
        .get(app.url("/api-docs/openapi.json"))
        .send()
        .await
        .expect("req fail")
        .json()
        .await
        .unwrap();

    assert!(doc["paths"]["/session/login"].is_object());
    assert!(doc["paths"]["/admin/announcements"].is_object());
}

#[tokio::test]
async fn test_anonymous_requests_are_unauthorized() {
    let app = spawn_app().await;

    for path in ["/me", "/notifications", "/faculty/reviews", "/admin/stats"] {
        let response = app.client.get(app.url(path)).send().await.expect("req fail");
        assert_eq!(response.status(), 401, "{path}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "not_authenticated");
    }
}

#[tokio::test]
async fn test_anonymous_view_is_login() {
    let app = spawn_app().await;

    let screen: Value = app
        .client
        .get(app.url("/view"))
        .send()
        .await
        .expect("req fail")
        .json()
        .await
        .unwrap();

    assert_eq!(screen["resolution"]["kind"], "login");
    assert_eq!(screen["content"]["view"], "login");
}

#[tokio::test]
async fn test_student_session_lifecycle() {
    let app = spawn_app().await;

    // 1. Sign in
    let response = app
        .login("student@university.edu", "student123", "student")
        .await;
    assert_eq!(response.status(), 200);
    let identity: Value = response.json().await.unwrap();
    assert_eq!(identity["role"], "student");
    assert_eq!(identity["roll_number"], "CS2021001");

    // 2. Session snapshot
    let session: Value = app
        .client
        .get(app.url("/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["status"], "authenticated");
    assert_eq!(session["identity"]["email"], "student@university.edu");

    // 3. Navigate to a student view
    let screen: Value = app
        .client
        .post(app.url("/navigate"))
        .json(&json!({ "view": "/leave-request" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(screen["resolution"]["kind"], "granted");
    assert_eq!(screen["content"]["view"], "leave_requests");

    // 4. Student data is reachable
    let notifications = app
        .client
        .get(app.url("/notifications"))
        .send()
        .await
        .unwrap();
    assert_eq!(notifications.status(), 200);

    // 5. Admin data is not
    let stats = app.client.get(app.url("/admin/stats")).send().await.unwrap();
    assert_eq!(stats.status(), 403);

    // 6. Sign out
    let logout = app
        .client
        .post(app.url("/session/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status(), 204);

    let me = app.client.get(app.url("/me")).send().await.unwrap();
    assert_eq!(me.status(), 401);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = spawn_app().await;

    let response = app
        .login("student@university.edu", "wrong", "student")
        .await;

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_student_email_as_admin_is_forbidden() {
    let app = spawn_app().await;

    let response = app
        .login("student@university.edu", "student123", "admin")
        .await;

    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_admin_publishes_announcement() {
    let app = spawn_app().await;
    assert_eq!(
        app.login("admin@university.edu", "", "admin").await.status(),
        200
    );

    let response = app
        .client
        .post(app.url("/admin/announcements"))
        .json(&json!({
            "title": "Convocation 2026",
            "content": "Convocation will be held in the main auditorium.",
            "target": "all",
            "priority": "high"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let announcements: Value = app
        .client
        .get(app.url("/announcements"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(announcements[0]["title"], "Convocation 2026");
}

#[tokio::test]
async fn test_faculty_navigation_menu() {
    let app = spawn_app().await;
    app.login("faculty@university.edu", "", "faculty").await;

    let menu: Value = app
        .client
        .get(app.url("/navigation"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let labels: Vec<_> = menu
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["label"].as_str().unwrap().to_string())
        .collect();
    assert!(labels.contains(&"Review Assignments".to_string()));
    assert!(!labels.contains(&"User Management".to_string()));
}

#[tokio::test]
async fn test_patch_me_changes_name() {
    let app = spawn_app().await;
    app.login("faculty@university.edu", "", "faculty").await;

    let response = app
        .client
        .patch(app.url("/me"))
        .json(&json!({ "name": "Prof. Debrup Das" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let identity: Value = response.json().await.unwrap();
    assert_eq!(identity["name"], "Prof. Debrup Das");
    assert_eq!(identity["role"], "faculty");
}

#[tokio::test]
async fn test_patch_me_cannot_grant_permissions() {
    let app = spawn_app().await;
    app.login("admin@university.edu", "", "admin").await;

    let response = app
        .client
        .patch(app.url("/me"))
        .json(&json!({ "profile": { "role": "admin", "permissions": ["root.everything"] } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);

    let me: Value = app.client.get(app.url("/me")).send().await.unwrap().json().await.unwrap();
    let permissions = me["permissions"].as_array().unwrap();
    assert!(!permissions.iter().any(|p| p == "root.everything"));
}
