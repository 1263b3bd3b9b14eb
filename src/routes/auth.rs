//! Auth routes — session middleware and extractors, sign-in, sign-out.

use std::convert::Infallible;

use axum::extract::{Form, FromRequestParts, Query, Request, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;
use tracing::{debug, info, warn};

use super::{FEED, LANDING};
use crate::backend::{AuthSession, Backend, BackendError};
use crate::error::ErrorCode;
use crate::services::session::{self, Session};
use crate::state::AppState;
use crate::views::{self, Notice};

pub const ACCESS_COOKIE: &str = "sb_access_token";
pub const REFRESH_COOKIE: &str = "sb_refresh_token";

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Store a freshly issued session in the jar.
fn issue_cookies(jar: CookieJar, auth: AuthSession, secure: bool) -> CookieJar {
    let jar = jar.add(session_cookie(ACCESS_COOKIE, auth.access_token, secure));
    match auth.refresh_token {
        Some(refresh) => jar.add(session_cookie(REFRESH_COOKIE, refresh, secure)),
        None => jar,
    }
}

fn clear_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(expired_cookie(ACCESS_COOKIE, secure))
        .add(expired_cookie(REFRESH_COOKIE, secure))
}

fn cookie_value<'a>(jar: &'a CookieJar, name: &str) -> &'a str {
    jar.get(name).map(Cookie::value).unwrap_or_default()
}

// =============================================================================
// SESSION RESOLUTION
// =============================================================================

/// Session resolved by [`resolve_session`], stored in request extensions.
#[derive(Clone)]
struct ResolvedSession(Option<Session>);

/// Outcome of trying the refresh cookie.
enum Renewal {
    Issued(AuthSession),
    /// The auth service refused the token; the cookies are stale.
    Rejected,
}

/// Try the refresh cookie once. `None` when there is nothing to try or the
/// service could not be reached.
async fn renew(backend: &dyn Backend, jar: &CookieJar) -> Option<Renewal> {
    match session::refresh(backend, cookie_value(jar, REFRESH_COOKIE)).await {
        Ok(auth) => auth.map(Renewal::Issued),
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "session refresh failed");
            matches!(e, BackendError::Api { status: 400..=499, .. }).then_some(Renewal::Rejected)
        }
    }
}

/// Middleware: resolve the session once per request from the access-token
/// cookie. An access token the auth service no longer accepts is renewed
/// from the refresh cookie, and the new tokens are written back unless the
/// handler set session cookies itself. Backend failures are logged and read
/// as "signed out".
pub async fn resolve_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let backend = state.backend.as_ref();
    let (session, renewal) = match session::current_session(backend, cookie_value(&jar, ACCESS_COOKIE)).await {
        Ok(Some(session)) => (Some(session), None),
        Ok(None) => match renew(backend, &jar).await {
            Some(Renewal::Issued(auth)) => {
                debug!(user_id = %auth.user.id, "session refreshed");
                (Some(Session::from_auth(&auth)), Some(Renewal::Issued(auth)))
            }
            other => (None, other),
        },
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "session lookup failed");
            (None, None)
        }
    };

    request.extensions_mut().insert(ResolvedSession(session));
    let response = next.run(request).await;

    let Some(renewal) = renewal else {
        return response;
    };
    if response.headers().contains_key(header::SET_COOKIE) {
        return response;
    }
    let jar = match renewal {
        Renewal::Issued(auth) => issue_cookies(CookieJar::new(), auth, state.cookie_secure),
        Renewal::Rejected => clear_cookies(CookieJar::new(), state.cookie_secure),
    };
    (jar, response).into_response()
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// The session for this request, as resolved by [`resolve_session`].
pub struct CurrentSession(pub Option<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resolved = parts.extensions.get::<ResolvedSession>().cloned();
        Ok(Self(resolved.and_then(|ResolvedSession(session)| session)))
    }
}

/// Guard for protected pages: the handler runs only with an active session;
/// otherwise the request is redirected to the landing page.
pub struct AuthGate(pub Session);

impl<S> FromRequestParts<S> for AuthGate
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = match CurrentSession::from_request_parts(parts, state).await {
            Ok(current) => current,
            Err(never) => match never {},
        };
        session.map(Self).ok_or_else(|| Redirect::temporary(LANDING))
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

/// `GET /` — sign-in form, or straight to the feed when already signed in.
pub async fn landing(CurrentSession(session): CurrentSession, Query(query): Query<NoticeQuery>) -> Response {
    if session.is_some() {
        return Redirect::temporary(FEED).into_response();
    }
    let notice = Notice::from_query(query.notice.as_deref());
    Html(views::landing::render(notice, None, String::new())).into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /login` — exchange credentials for session cookies.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    match session::sign_in(state.backend.as_ref(), &form.email, &form.password).await {
        Ok(auth) => {
            info!(user_id = %auth.user.id, "signed in");
            let jar = issue_cookies(jar, auth, state.cookie_secure);
            (jar, Redirect::to(FEED)).into_response()
        }
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "sign-in failed");
            let html = views::landing::render(None, Some(e.to_string()), form.email);
            (StatusCode::UNAUTHORIZED, Html(html)).into_response()
        }
    }
}

/// `POST /logout` — sign out remotely, clear cookies, go to the landing page.
/// The redirect happens whether or not the remote sign-out succeeded.
pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
) -> Response {
    if let Some(session) = session {
        if let Err(e) = session::sign_out(state.backend.as_ref(), &session.token).await {
            warn!(error = %e, code = e.error_code(), "sign-out failed");
        }
    }

    let jar = clear_cookies(jar, state.cookie_secure);
    (jar, Redirect::to(LANDING)).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
