use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AuthError, PortalError},
    models::{Identity, Role},
    session::SessionState,
};

/// Claims
///
/// The subset of a Supabase access token's payload the portal relies on when a
/// restored session is validated locally.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the identity store's user id.
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration Time (exp): the token must not be accepted after this instant.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// decode_access_token
///
/// Verifies the token signature with the project's JWT secret and enforces
/// expiry. Supabase tokens carry `aud = "authenticated"`; the audience is not
/// checked because the signature already binds the token to this project.
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.validate_aud = false;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("stored access token has expired");
                }
                kind => {
                    tracing::warn!(?kind, "stored access token failed validation");
                }
            }
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// CurrentUser
///
/// Extractor for the identity held by the Session Manager. Handlers that take a
/// `CurrentUser` argument are only reached by an authenticated session; an
/// anonymous request is rejected with `PortalError::NotAuthenticated` (401).
///
/// Data endpoints check roles with `require_role`, which is fail-closed (403),
/// unlike view navigation which falls back softly.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl CurrentUser {
    pub fn require_role(&self, role: Role) -> Result<&Identity, PortalError> {
        if self.0.role() == role {
            Ok(&self.0)
        } else {
            Err(PortalError::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = PortalError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = SessionState::from_ref(state);
        session
            .current()
            .await
            .map(CurrentUser)
            .ok_or(PortalError::NotAuthenticated)
    }
}
