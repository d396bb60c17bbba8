use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::RwLock;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    directory::LocalRoleDirectory,
    error::AuthError,
    identity_store::IdentityStoreState,
    models::{Identity, Role, UpdateUserRequest, normalize_email},
};

/// SessionStatus
///
/// Observable state of the single session slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SessionStatus {
    Anonymous,
    /// A login is in flight and no identity is set yet.
    Authenticating,
    Authenticated,
}

/// SessionSnapshot
///
/// Output schema for `GET /session`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
}

/// SessionManager
///
/// The single owner of the "who is logged in" slot. Every other component reads
/// the current Identity through `current()`; only the operations below write it.
///
/// Concurrency model:
/// - The slot is a `tokio::sync::RwLock<Option<Identity>>`. An Identity is built
///   completely before the write lock is taken, so readers never see a partial
///   record.
/// - Logins are not queued. Each one writes its own result when it completes and
///   the last to complete wins.
/// - An in-flight counter backs the `authenticating` status.
pub struct SessionManager {
    store: IdentityStoreState,
    directory: Arc<LocalRoleDirectory>,
    current: RwLock<Option<Identity>>,
    in_flight: AtomicUsize,
}

/// SessionState
///
/// The concrete type used to share the Session Manager across the application.
pub type SessionState = Arc<SessionManager>;

/// Decrements the in-flight counter however the login ends.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SessionManager {
    pub fn new(store: IdentityStoreState, directory: Arc<LocalRoleDirectory>) -> Self {
        Self {
            store,
            directory,
            current: RwLock::new(None),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn directory(&self) -> &LocalRoleDirectory {
        &self.directory
    }

    pub async fn current(&self) -> Option<Identity> {
        self.current.read().await.clone()
    }

    pub async fn current_role(&self) -> Option<Role> {
        self.current.read().await.as_ref().map(Identity::role)
    }

    pub async fn status(&self) -> SessionStatus {
        if self.current.read().await.is_some() {
            SessionStatus::Authenticated
        } else if self.in_flight.load(Ordering::SeqCst) > 0 {
            SessionStatus::Authenticating
        } else {
            SessionStatus::Anonymous
        }
    }

    /// Status and identity read under one guard, so they always agree.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let slot = self.current.read().await;
        let status = if slot.is_some() {
            SessionStatus::Authenticated
        } else if self.in_flight.load(Ordering::SeqCst) > 0 {
            SessionStatus::Authenticating
        } else {
            SessionStatus::Anonymous
        };
        SessionSnapshot {
            status,
            identity: slot.clone(),
        }
    }

    /// login
    ///
    /// Authenticates `email` under `role` and makes the result the current
    /// Identity, replacing whatever was there.
    ///
    /// Students go through the identity store. Faculty and admins are resolved
    /// from the local directory, where the password is not checked. An email
    /// that belongs to the other category is refused with `RoleNotAllowed`.
    ///
    /// A directory login that replaces a student session ends the store
    /// session too, so a restart cannot bring the student back.
    pub async fn login(&self, email: &str, password: &str, role: Role) -> Result<Identity, AuthError> {
        let _guard = InFlightGuard::enter(&self.in_flight);
        let email = normalize_email(email);

        let result = match role {
            Role::Student => self.login_student(&email, password).await,
            Role::Faculty | Role::Admin => self.login_local(&email, role).await,
        };

        match result {
            Ok(identity) => {
                let previous = self.current.write().await.replace(identity.clone());
                tracing::info!(email = %identity.email, role = %role, id = %identity.id, "login succeeded");

                let replaced_student = previous.is_some_and(|p| p.role() == Role::Student);
                if role != Role::Student && replaced_student {
                    if let Err(e) = self.store.invalidate_session().await {
                        tracing::warn!(error = %e, "could not end the replaced student session");
                    }
                }
                Ok(identity)
            }
            Err(e) => {
                tracing::warn!(email = %email, role = %role, error = %e, "login failed");
                Err(e)
            }
        }
    }

    async fn login_student(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if self.directory.contains(email) {
            return Err(AuthError::RoleNotAllowed(Role::Student));
        }

        let token = self.store.verify_credentials(email, password).await?;

        match self.store.fetch_profile(&token.email).await {
            Ok(record) => Ok(record.into_identity()),
            Err(e) => {
                // Don't leave an orphaned store session behind a failed login.
                if let Err(invalidate) = self.store.invalidate_session().await {
                    tracing::warn!(error = %invalidate, "could not invalidate session after failed profile lookup");
                }
                Err(e)
            }
        }
    }

    async fn login_local(&self, email: &str, role: Role) -> Result<Identity, AuthError> {
        if let Some(identity) = self.directory.lookup(email) {
            return if identity.role() == role {
                Ok(identity)
            } else {
                Err(AuthError::AccountNotFound)
            };
        }

        if self.directory.is_student_reserved(email) {
            return Err(AuthError::RoleNotAllowed(role));
        }

        // Not a directory account: a student profile in the store still
        // marks the address as belonging to the student category.
        match self.store.fetch_profile(email).await {
            Ok(_) => Err(AuthError::RoleNotAllowed(role)),
            Err(AuthError::ProfileNotFound) => Err(AuthError::AccountNotFound),
            Err(e) => {
                tracing::debug!(email = %email, error = %e, "student lookup unavailable during directory login");
                Err(AuthError::AccountNotFound)
            }
        }
    }

    /// logout
    ///
    /// Clears the slot, then asks the identity store to end its session.
    /// Invalidation failures are logged and swallowed; logout always succeeds.
    pub async fn logout(&self) {
        let previous = self.current.write().await.take();

        if let Err(e) = self.store.invalidate_session().await {
            tracing::warn!(error = %e, "identity store invalidation failed during logout");
        }

        match previous {
            Some(identity) => tracing::info!(email = %identity.email, "logged out"),
            None => tracing::debug!("logout requested while anonymous"),
        }
    }

    /// update_user
    ///
    /// Shallow-merges `patch` into the current Identity. Returns `Ok(None)` and
    /// changes nothing when the session is anonymous.
    pub async fn update_user(&self, patch: UpdateUserRequest) -> Result<Option<Identity>, AuthError> {
        let mut slot = self.current.write().await;
        let Some(current) = slot.as_ref() else {
            tracing::debug!("profile update ignored: no active session");
            return Ok(None);
        };

        // Merge into a copy so a rejected patch leaves the slot untouched.
        let mut updated = current.clone();
        updated.apply(patch)?;
        *slot = Some(updated.clone());

        tracing::info!(email = %updated.email, "profile updated");
        Ok(Some(updated))
    }

    /// restore_session
    ///
    /// Run once at startup. Picks up a session the identity store still
    /// considers valid and re-fetches its profile. Every failure is logged and
    /// leaves the session anonymous. A login that completes first is kept.
    pub async fn restore_session(&self) -> Option<Identity> {
        let token = match self.store.current_session().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::debug!("no previous session to restore");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "session restore failed");
                return None;
            }
        };

        if self.directory.contains(&token.email) {
            tracing::warn!(email = %token.email, "stored session belongs to a directory account; ignoring");
            return None;
        }

        let identity = match self.store.fetch_profile(&token.email).await {
            Ok(record) => record.into_identity(),
            Err(e) => {
                tracing::warn!(email = %token.email, error = %e, "could not fetch profile for restored session");
                return None;
            }
        };

        let mut slot = self.current.write().await;
        if slot.is_some() {
            tracing::debug!("session restore skipped: a login completed first");
            return None;
        }
        *slot = Some(identity.clone());
        tracing::info!(email = %identity.email, "session restored");
        Some(identity)
    }
}
