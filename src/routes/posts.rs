//! Composer routes.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::{error, warn};

use super::auth::{AuthGate, CurrentSession};
use crate::error::ErrorCode;
use crate::services::post::{self as post_svc, PostError};
use crate::services::profile;
use crate::state::AppState;
use crate::views::{self, Notice};

/// `GET /create-post` — empty composer.
pub async fn composer_page(State(state): State<AppState>, AuthGate(session): AuthGate) -> Html<String> {
    let username = profile::display_name(state.backend.as_ref(), Some(&session)).await;
    Html(views::composer::render(username, None, String::new()))
}

#[derive(Debug, Deserialize)]
pub struct ComposeForm {
    #[serde(default)]
    pub content: String,
}

/// `POST /create-post` — re-check the session, insert, then go to the feed.
/// Failures re-render the composer with the draft and an inline error.
pub async fn create_post(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<ComposeForm>,
) -> Response {
    let backend = state.backend.as_ref();
    let Err(e) = post_svc::create_post(backend, session.as_ref(), &form.content).await else {
        let target = format!("/feed?notice={}", Notice::PostCreated.query_value());
        return Redirect::to(&target).into_response();
    };

    let status = match &e {
        PostError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        PostError::EmptyContent => StatusCode::UNPROCESSABLE_ENTITY,
        PostError::Backend(_) => StatusCode::BAD_GATEWAY,
    };
    if matches!(e, PostError::Backend(_)) {
        error!(error = %e, code = e.error_code(), retryable = e.retryable(), "creating post failed");
    } else {
        warn!(code = e.error_code(), "post rejected");
    }

    let username = profile::display_name(backend, session.as_ref()).await;
    let html = views::composer::render(username, Some(e.inline_message()), form.content);
    (status, Html(html)).into_response()
}
