//! Feed routes — render the feed, toggle likes.

use axum::extract::{Path, Query, State};
use axum::response::{Html, Redirect};
use tracing::error;

use super::FEED;
use super::auth::{AuthGate, CurrentSession, NoticeQuery};
use crate::backend::RowId;
use crate::error::ErrorCode;
use crate::services::feed::{self as feed_svc, LikeError};
use crate::services::profile;
use crate::state::AppState;
use crate::views::{self, Notice};

/// `GET /feed` — posts newest first with like counts. Fetch failures render
/// an empty list.
pub async fn feed_page(
    State(state): State<AppState>,
    AuthGate(session): AuthGate,
    Query(query): Query<NoticeQuery>,
) -> Html<String> {
    let backend = state.backend.as_ref();
    let username = profile::display_name(backend, Some(&session)).await;
    let posts = feed_svc::load_feed(backend, &session).await;
    let notice = Notice::from_query(query.notice.as_deref());
    Html(views::feed::render(username, notice, posts))
}

/// `POST /feed/{post_id}/like` — toggle the caller's like, then reload the
/// feed whatever the outcome. Signed-out callers are sent to the landing
/// page with a notice instead.
pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(post_id): Path<String>,
) -> Redirect {
    let post_id = RowId::new(post_id);
    match feed_svc::toggle_like(&state, session.as_ref(), &post_id).await {
        Ok(_) => {}
        Err(LikeError::NotAuthenticated) => {
            return Redirect::to(&format!("/?notice={}", Notice::LoginRequired.query_value()));
        }
        Err(e) => {
            error!(error = %e, code = e.error_code(), retryable = e.retryable(), %post_id, "like toggle failed");
        }
    }
    Redirect::to(FEED)
}

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;
