//! Session accessor — current principal, sign-in, and sign-out.
//!
//! ARCHITECTURE
//! ============
//! The auth service owns sessions; this process keeps nothing beyond the
//! request in flight. Every lookup is a fresh remote call keyed by the access
//! token the browser presents, and the result is handed to handlers as an
//! explicit [`Session`] value instead of being re-read by each view.

use crate::backend::{AuthSession, Backend, BackendError, SessionUser};
use crate::error::ErrorCode;

/// An authenticated principal plus the token that proves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: SessionUser,
    pub token: String,
}

impl Session {
    /// The session a sign-in or refresh just issued.
    #[must_use]
    pub fn from_auth(auth: &AuthSession) -> Self {
        Self { user: auth.user.clone(), token: auth.access_token.clone() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("Email and password are required.")]
    MissingCredentials,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ErrorCode for SignInError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "E_MISSING_CREDENTIALS",
            Self::Backend(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Backend(e) if e.retryable())
    }
}

/// Resolve the session behind `token`. An empty token short-circuits to
/// `None` without a remote call.
///
/// # Errors
///
/// Returns the backend error if the auth service cannot be reached.
pub async fn current_session(backend: &dyn Backend, token: &str) -> Result<Option<Session>, BackendError> {
    if token.is_empty() {
        return Ok(None);
    }
    let user = backend.get_user(token).await?;
    Ok(user.map(|user| Session { user, token: token.to_owned() }))
}

/// Sign in with email and password.
///
/// # Errors
///
/// Returns [`SignInError::MissingCredentials`] for blank input (no remote
/// call), or the backend's rejection.
pub async fn sign_in(backend: &dyn Backend, email: &str, password: &str) -> Result<AuthSession, SignInError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(SignInError::MissingCredentials);
    }
    Ok(backend.sign_in_with_password(email, password).await?)
}

/// Renew an expired session from its refresh token. An empty token
/// short-circuits to `None` without a remote call.
///
/// # Errors
///
/// Returns the backend error, including the auth service's rejection of a
/// used or revoked refresh token.
pub async fn refresh(backend: &dyn Backend, refresh_token: &str) -> Result<Option<AuthSession>, BackendError> {
    if refresh_token.is_empty() {
        return Ok(None);
    }
    backend.refresh_session(refresh_token).await.map(Some)
}

/// Invalidate the session with the auth service. Navigation afterwards is
/// the caller's concern.
///
/// # Errors
///
/// Returns the backend error; callers typically log it and carry on.
pub async fn sign_out(backend: &dyn Backend, token: &str) -> Result<(), BackendError> {
    backend.sign_out(token).await
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
