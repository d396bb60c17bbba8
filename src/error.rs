use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::Role;

/// AuthError
///
/// The taxonomy shared by the Session Manager, the Identity Store adapters and the
/// Local Role Directory. Every message is safe to show to the person signing in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The identity store rejected the email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Credentials were accepted but no profile row matches the email.
    #[error("no student profile is registered for this account")]
    ProfileNotFound,

    /// The email is not in the local directory under the requested role.
    #[error("no account found for this email and role")]
    AccountNotFound,

    /// The email is reserved for another role category.
    #[error("this email cannot sign in as {0}")]
    RoleNotAllowed(Role),

    /// A required setting (environment variable name) is absent.
    #[error("identity store is not configured: {0} is missing")]
    ConfigurationMissing(&'static str),

    /// The identity store could not be reached or answered unexpectedly.
    #[error("identity store is unavailable: {0}")]
    TransientNetworkFailure(String),

    #[error("the role of an account cannot be changed")]
    RoleImmutable,

    #[error("profile fields do not match the account role")]
    ProfileMismatch,
}

impl AuthError {
    /// Stable machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::ProfileNotFound => "profile_not_found",
            Self::AccountNotFound => "account_not_found",
            Self::RoleNotAllowed(_) => "role_not_allowed",
            Self::ConfigurationMissing(_) => "configuration_missing",
            Self::TransientNetworkFailure(_) => "transient_network_failure",
            Self::RoleImmutable => "role_immutable",
            Self::ProfileMismatch => "profile_mismatch",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// - Credential and account failures: 401 Unauthorized
    /// - Cross-role email reuse: 403 Forbidden
    /// - Missing configuration: 503 Service Unavailable
    /// - Identity store failures: 502 Bad Gateway
    /// - Rejected profile updates: 422 Unprocessable Entity
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::ProfileNotFound | Self::AccountNotFound => {
                StatusCode::UNAUTHORIZED
            }
            Self::RoleNotAllowed(_) => StatusCode::FORBIDDEN,
            Self::ConfigurationMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::TransientNetworkFailure(_) => StatusCode::BAD_GATEWAY,
            Self::RoleImmutable | Self::ProfileMismatch => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// PortalError
///
/// Handler-level error. Wraps `AuthError` and adds the outcomes of the data
/// endpoints, which are fail-closed (unlike view navigation).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("sign in to continue")]
    NotAuthenticated,

    #[error("this action is not available for your role")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),
}

impl PortalError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.code(),
            Self::NotAuthenticated => "not_authenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_failed",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(e) => e.status_code(),
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// ErrorBody
///
/// JSON shape of every error response: `{"error": "<code>", "message": "<text>"}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        PortalError::Auth(self).into_response()
    }
}
