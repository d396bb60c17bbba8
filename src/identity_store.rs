use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::decode_access_token,
    config::{AppConfig, IdentityStoreEndpoint},
    error::AuthError,
    models::{Course, Identity, RoleProfile, StudentProfile, normalize_email},
};

/// Name of the remote table holding student profile rows.
pub const PROFILE_TABLE: &str = "profiles";

// 1. IdentityStore Contract
/// IdentityStore
///
/// The contract for the external account directory consulted for students.
/// The Session Manager only ever talks to this trait, so the real Supabase client,
/// the unconfigured stand-in and the in-memory mock are interchangeable.
///
/// Implementations make a single attempt per call: no retries, no timeouts.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Exchanges an email/password pair for a session token.
    async fn verify_credentials(&self, email: &str, password: &str)
    -> Result<SessionToken, AuthError>;

    /// Fetches the profile row whose email equals `email`.
    async fn fetch_profile(&self, email: &str) -> Result<StudentProfileRecord, AuthError>;

    /// Returns the previously established session, if one is still valid.
    async fn current_session(&self) -> Result<Option<SessionToken>, AuthError>;

    /// Asks the store to end its session. Callers tolerate failure.
    async fn invalidate_session(&self) -> Result<(), AuthError>;
}

/// IdentityStoreState
///
/// The concrete type used to share the identity store across the application.
pub type IdentityStoreState = Arc<dyn IdentityStore>;

/// SessionToken
///
/// What the identity store hands back after a successful credential exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    pub user_id: Uuid,
    pub email: String,
    /// Unix timestamp (seconds) after which the token is no longer accepted.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// StudentProfileRecord
///
/// A row of the remote profile table. Always describes a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfileRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    pub roll_number: String,
    pub program: String,
    pub semester: u8,
    pub cgpa: f64,
    pub attendance: f64,
    #[serde(default)]
    pub courses: Vec<Course>,
}

impl StudentProfileRecord {
    pub fn into_identity(self) -> Identity {
        Identity {
            id: self.id,
            email: normalize_email(&self.email),
            name: self.name,
            avatar: self.avatar,
            department: self.department,
            institution: self.institution,
            profile: RoleProfile::Student(StudentProfile {
                roll_number: self.roll_number,
                program: self.program,
                semester: self.semester,
                cgpa: self.cgpa,
                attendance: self.attendance,
                courses: self.courses,
            }),
        }
    }
}

// 2. The Real Implementation (Supabase Auth + REST)

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    user: RemoteUser,
}

#[derive(Deserialize)]
struct RemoteUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// SupabaseIdentityStore
///
/// Talks to a Supabase project:
/// - `POST /auth/v1/token?grant_type=password` for the credential exchange,
/// - `GET /rest/v1/profiles?email=eq.<email>` for the profile row,
/// - `GET /auth/v1/user` to check a held token (unless a JWT secret is configured),
/// - `POST /auth/v1/logout` to end the session.
///
/// The current token lives in memory and, when a cache path is configured, in a
/// small JSON file so `current_session` can pick it up after a restart.
pub struct SupabaseIdentityStore {
    client: reqwest::Client,
    endpoint: IdentityStoreEndpoint,
    jwt_secret: Option<String>,
    cache_path: Option<PathBuf>,
    session: RwLock<Option<SessionToken>>,
}

impl SupabaseIdentityStore {
    pub fn new(
        endpoint: IdentityStoreEndpoint,
        jwt_secret: Option<String>,
        cache_path: Option<PathBuf>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            jwt_secret,
            cache_path,
            session: RwLock::new(None),
        }
    }

    /// Builds the client from `AppConfig`, failing with `ConfigurationMissing`
    /// when either secret is absent.
    pub fn from_config(config: &AppConfig) -> Result<Self, AuthError> {
        let endpoint = config.identity_store_endpoint()?;
        Ok(Self::new(
            endpoint,
            config.jwt_secret.clone(),
            config.session_cache_path.clone(),
        ))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.url, path)
    }

    async fn persist(&self, token: &SessionToken) {
        let Some(path) = &self.cache_path else { return };
        let bytes = match serde_json::to_vec(token) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "could not encode session cache");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(path, bytes).await {
            tracing::warn!(path = %path.display(), error = %e, "could not write session cache");
        }
    }

    async fn load_cached(&self) -> Option<SessionToken> {
        let path = self.cache_path.as_ref()?;
        let bytes = tokio::fs::read(path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session cache");
                None
            }
        }
    }

    async fn clear_cache(&self) {
        let Some(path) = &self.cache_path else { return };
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "could not remove session cache");
            }
        }
    }

    /// Asks the store whether `token` is still accepted.
    async fn validate_remote(&self, token: &SessionToken) -> Result<bool, AuthError> {
        let response = self
            .client
            .get(self.url("/auth/v1/user"))
            .header("apikey", &self.endpoint.api_key)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(network_failure)?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            status => Err(AuthError::TransientNetworkFailure(format!(
                "user endpoint returned {status}"
            ))),
        }
    }
}

fn network_failure(e: reqwest::Error) -> AuthError {
    AuthError::TransientNetworkFailure(e.to_string())
}

#[async_trait]
impl IdentityStore for SupabaseIdentityStore {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionToken, AuthError> {
        let email = normalize_email(email);
        let response = self
            .client
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.endpoint.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(network_failure)?;

        match response.status() {
            status if status.is_success() => {}
            // Supabase answers a wrong password with 400 `invalid_grant`.
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY => {
                return Err(AuthError::InvalidCredentials);
            }
            status => {
                return Err(AuthError::TransientNetworkFailure(format!(
                    "token endpoint returned {status}"
                )));
            }
        }

        let body = response
            .json::<TokenResponse>()
            .await
            .map_err(network_failure)?;

        let token = SessionToken {
            access_token: body.access_token,
            user_id: body.user.id,
            email: body
                .user
                .email
                .map(|e| normalize_email(&e))
                .unwrap_or(email),
            expires_at: body.expires_at,
        };

        *self.session.write().await = Some(token.clone());
        self.persist(&token).await;

        Ok(token)
    }

    async fn fetch_profile(&self, email: &str) -> Result<StudentProfileRecord, AuthError> {
        // Row-level security keys off the caller's token; fall back to the anon key.
        let bearer = self
            .session
            .read()
            .await
            .as_ref()
            .map(|token| token.access_token.clone())
            .unwrap_or_else(|| self.endpoint.api_key.clone());

        let response = self
            .client
            .get(self.url(&format!("/rest/v1/{PROFILE_TABLE}")))
            .query(&[
                ("email", format!("eq.{}", normalize_email(email))),
                ("select", "*".to_string()),
            ])
            .header("apikey", &self.endpoint.api_key)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(network_failure)?;

        if !response.status().is_success() {
            return Err(AuthError::TransientNetworkFailure(format!(
                "profile lookup returned {}",
                response.status()
            )));
        }

        let rows = response
            .json::<Vec<StudentProfileRecord>>()
            .await
            .map_err(network_failure)?;

        rows.into_iter().next().ok_or(AuthError::ProfileNotFound)
    }

    async fn current_session(&self) -> Result<Option<SessionToken>, AuthError> {
        let held = self.session.read().await.clone();
        let token = match held {
            Some(token) => Some(token),
            None => self.load_cached().await,
        };
        let Some(token) = token else {
            return Ok(None);
        };

        let valid = match &self.jwt_secret {
            Some(secret) => decode_access_token(&token.access_token, secret).is_ok(),
            None => self.validate_remote(&token).await?,
        };

        if valid {
            *self.session.write().await = Some(token.clone());
            Ok(Some(token))
        } else {
            tracing::info!(email = %token.email, "stored session is no longer valid");
            *self.session.write().await = None;
            self.clear_cache().await;
            Ok(None)
        }
    }

    async fn invalidate_session(&self) -> Result<(), AuthError> {
        let token = self.session.write().await.take();
        self.clear_cache().await;

        let Some(token) = token else {
            return Ok(());
        };

        let response = self
            .client
            .post(self.url("/auth/v1/logout"))
            .header("apikey", &self.endpoint.api_key)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(network_failure)?;

        match response.status() {
            // 401 means the token was already dead, which is the goal anyway.
            status if status.is_success() || status == StatusCode::UNAUTHORIZED => Ok(()),
            status => Err(AuthError::TransientNetworkFailure(format!(
                "logout endpoint returned {status}"
            ))),
        }
    }
}

// 3. The Unconfigured Stand-in

/// UnconfiguredIdentityStore
///
/// Installed when the identity store secrets are missing. Every credential or
/// profile call fails with `ConfigurationMissing`, so student sign-in reports the
/// missing variable instead of failing silently. There is never a session to
/// restore or invalidate.
pub struct UnconfiguredIdentityStore {
    missing: &'static str,
}

impl UnconfiguredIdentityStore {
    pub fn new(missing: &'static str) -> Self {
        Self { missing }
    }
}

#[async_trait]
impl IdentityStore for UnconfiguredIdentityStore {
    async fn verify_credentials(&self, _email: &str, _password: &str) -> Result<SessionToken, AuthError> {
        Err(AuthError::ConfigurationMissing(self.missing))
    }

    async fn fetch_profile(&self, _email: &str) -> Result<StudentProfileRecord, AuthError> {
        Err(AuthError::ConfigurationMissing(self.missing))
    }

    async fn current_session(&self) -> Result<Option<SessionToken>, AuthError> {
        Ok(None)
    }

    async fn invalidate_session(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

// 4. The Mock Implementation (For Tests)

struct MockAccount {
    password: String,
    user_id: Uuid,
}

/// MockIdentityStore
///
/// An in-memory `IdentityStore` used by the test suites. Accounts and profile
/// rows are registered separately so "valid password, missing profile" can be
/// expressed. Artificial latency is only ever introduced here.
#[derive(Default)]
pub struct MockIdentityStore {
    accounts: HashMap<String, MockAccount>,
    profiles: HashMap<String, StudentProfileRecord>,
    latency: HashMap<String, Duration>,
    session: RwLock<Option<SessionToken>>,
    unavailable: bool,
    fail_profile_lookup: bool,
    fail_invalidate: bool,
    invalidations: AtomicUsize,
}

impl MockIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The seeded demo student (`student@university.edu` / `student123`).
    pub fn demo() -> Self {
        Self::new().with_student("student123", demo_student_record())
    }

    /// Registers an account together with its profile row.
    pub fn with_student(mut self, password: &str, record: StudentProfileRecord) -> Self {
        let email = normalize_email(&record.email);
        self.accounts.insert(
            email.clone(),
            MockAccount {
                password: password.to_string(),
                user_id: Uuid::new_v4(),
            },
        );
        self.profiles.insert(email, record);
        self
    }

    /// Registers an account that has no profile row.
    pub fn with_account_without_profile(mut self, email: &str, password: &str) -> Self {
        self.accounts.insert(
            normalize_email(email),
            MockAccount {
                password: password.to_string(),
                user_id: Uuid::new_v4(),
            },
        );
        self
    }

    /// Pretends a session was established before the process started.
    pub fn with_session(mut self, token: SessionToken) -> Self {
        self.session = RwLock::new(Some(token));
        self
    }

    /// Delays the credential exchange for `email`.
    pub fn with_latency(mut self, email: &str, delay: Duration) -> Self {
        self.latency.insert(normalize_email(email), delay);
        self
    }

    /// Every call fails as if the network were down.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Credentials still verify, but `fetch_profile` fails as if the network
    /// dropped between the two calls.
    pub fn failing_profile_lookup(mut self) -> Self {
        self.fail_profile_lookup = true;
        self
    }

    /// `invalidate_session` always fails.
    pub fn failing_invalidation(mut self) -> Self {
        self.fail_invalidate = true;
        self
    }

    pub fn invalidation_calls(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }

    pub async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    fn check_available(&self) -> Result<(), AuthError> {
        if self.unavailable {
            Err(AuthError::TransientNetworkFailure(
                "mock identity store is unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IdentityStore for MockIdentityStore {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionToken, AuthError> {
        self.check_available()?;
        let email = normalize_email(email);
        if let Some(delay) = self.latency.get(&email) {
            tokio::time::sleep(*delay).await;
        }

        let account = self
            .accounts
            .get(&email)
            .filter(|account| account.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        let token = SessionToken {
            access_token: format!("mock-token-{}", account.user_id),
            user_id: account.user_id,
            email,
            expires_at: None,
        };
        *self.session.write().await = Some(token.clone());
        Ok(token)
    }

    async fn fetch_profile(&self, email: &str) -> Result<StudentProfileRecord, AuthError> {
        self.check_available()?;
        if self.fail_profile_lookup {
            return Err(AuthError::TransientNetworkFailure(
                "mock profile lookup failure".to_string(),
            ));
        }
        self.profiles
            .get(&normalize_email(email))
            .cloned()
            .ok_or(AuthError::ProfileNotFound)
    }

    async fn current_session(&self) -> Result<Option<SessionToken>, AuthError> {
        self.check_available()?;
        Ok(self.session.read().await.clone())
    }

    async fn invalidate_session(&self) -> Result<(), AuthError> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        if self.fail_invalidate {
            return Err(AuthError::TransientNetworkFailure(
                "mock invalidation failure".to_string(),
            ));
        }
        *self.session.write().await = None;
        Ok(())
    }
}

/// The demo student profile row mirrored in the remote profile table.
pub fn demo_student_record() -> StudentProfileRecord {
    StudentProfileRecord {
        id: "STU001".to_string(),
        email: "student@university.edu".to_string(),
        name: "Ankit Sarkar".to_string(),
        avatar: Some("https://api.dicebear.com/9.x/dylan/svg?seed=Alex".to_string()),
        department: Some("Computer Science".to_string()),
        institution: Some("Tech University".to_string()),
        roll_number: "CS2021001".to_string(),
        program: "B.Tech Computer Science".to_string(),
        semester: 6,
        cgpa: 8.5,
        attendance: 87.0,
        courses: vec![
            Course {
                id: "CSE301".to_string(),
                code: "CSE301".to_string(),
                name: "Data Structures".to_string(),
                credits: 4,
                progress: Some(75),
                grade: Some("A".to_string()),
                attendance: Some(90.0),
                ..Course::default()
            },
            Course {
                id: "CSE302".to_string(),
                code: "CSE302".to_string(),
                name: "Database Systems".to_string(),
                credits: 3,
                progress: Some(60),
                grade: Some("B+".to_string()),
                attendance: Some(85.0),
                ..Course::default()
            },
            Course {
                id: "CSE303".to_string(),
                code: "CSE303".to_string(),
                name: "Computer Networks".to_string(),
                credits: 4,
                progress: Some(80),
                grade: Some("A-".to_string()),
                attendance: Some(88.0),
                ..Course::default()
            },
        ],
    }
}
