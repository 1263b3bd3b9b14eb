//! Feed service — fetch posts with like counts, toggle likes.
//!
//! DESIGN
//! ======
//! The feed is read in one joined query (author username + like ids) that
//! the backend orders newest first; the like count is the length of the
//! joined like array and is never cached.
//!
//! A like toggle is either the lookup / delete-or-insert sequence or, when
//! configured, one server-side function call. The sequence is not atomic on
//! the backend, so toggles for the same (post, user) pair are serialized
//! through `LikeLocks` inside this process. Callers refetch the feed after
//! every toggle regardless of outcome.

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use super::session::Session;
use crate::backend::{Backend, BackendError, FeedRow, LikeRow, NewLike, RowId};
use crate::error::ErrorCode;
use crate::state::AppState;

/// Author name shown when a post's profile join comes back empty.
pub const UNKNOWN_AUTHOR: &str = "unknown";

// =============================================================================
// TYPES
// =============================================================================

/// A post as displayed in the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPost {
    pub id: RowId,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub like_count: usize,
}

impl From<FeedRow> for FeedPost {
    fn from(row: FeedRow) -> Self {
        Self {
            like_count: like_count(row.likes.as_deref()),
            username: row
                .profiles
                .map_or_else(|| UNKNOWN_AUTHOR.to_owned(), |p| p.username),
            id: row.id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeToggle {
    Liked,
    Unliked,
}

#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    #[error("You need to log in to like a post.")]
    NotAuthenticated,
    #[error("checking existing like failed: {0}")]
    Lookup(BackendError),
    #[error("unliking post failed: {0}")]
    Unlike(BackendError),
    #[error("liking post failed: {0}")]
    Like(BackendError),
    #[error("toggle function failed: {0}")]
    Rpc(BackendError),
}

impl ErrorCode for LikeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "E_NOT_AUTHENTICATED",
            Self::Lookup(_) => "E_LIKE_LOOKUP",
            Self::Unlike(_) => "E_UNLIKE",
            Self::Like(_) => "E_LIKE",
            Self::Rpc(_) => "E_LIKE_RPC",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::NotAuthenticated => false,
            Self::Lookup(e) | Self::Unlike(e) | Self::Like(e) | Self::Rpc(e) => e.retryable(),
        }
    }
}

// =============================================================================
// FETCH
// =============================================================================

/// Like count for a joined like array; absent or null counts as zero.
#[must_use]
pub fn like_count(likes: Option<&[LikeRow]>) -> usize {
    likes.map_or(0, <[LikeRow]>::len)
}

/// Fetch the feed, newest first.
///
/// # Errors
///
/// Returns the backend error unchanged.
pub async fn fetch_feed(backend: &dyn Backend, session: &Session) -> Result<Vec<FeedPost>, BackendError> {
    let rows = backend.fetch_feed(&session.token).await?;
    Ok(rows.into_iter().map(FeedPost::from).collect())
}

/// Fetch the feed for display: failures are logged and render as empty.
pub async fn load_feed(backend: &dyn Backend, session: &Session) -> Vec<FeedPost> {
    match fetch_feed(backend, session).await {
        Ok(posts) => posts,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "fetching posts failed");
            Vec::new()
        }
    }
}

// =============================================================================
// LIKE TOGGLE
// =============================================================================

/// Toggle the signed-in user's like on `post_id`.
///
/// # Errors
///
/// [`LikeError::NotAuthenticated`] without any remote call when signed out;
/// otherwise the step that failed. Nothing is retried.
pub async fn toggle_like(
    state: &AppState,
    session: Option<&Session>,
    post_id: &RowId,
) -> Result<LikeToggle, LikeError> {
    let session = session.ok_or(LikeError::NotAuthenticated)?;
    let backend = state.backend.as_ref();

    let _guard = state.like_locks.acquire(post_id, session.user.id).await;

    let outcome = match state.like_toggle_rpc.as_deref() {
        Some(function) => backend
            .toggle_like_rpc(&session.token, function, post_id)
            .await
            .map(|liked| if liked { LikeToggle::Liked } else { LikeToggle::Unliked })
            .map_err(LikeError::Rpc)?,
        None => toggle_sequence(backend, session, post_id).await?,
    };

    debug!(%post_id, user_id = %session.user.id, ?outcome, "like toggled");
    Ok(outcome)
}

/// Lookup, then delete the existing row or insert a new one.
async fn toggle_sequence(backend: &dyn Backend, session: &Session, post_id: &RowId) -> Result<LikeToggle, LikeError> {
    let existing = backend
        .find_like(&session.token, post_id, session.user.id)
        .await
        .map_err(LikeError::Lookup)?;

    if let Some(like) = existing {
        backend
            .delete_like(&session.token, &like.id)
            .await
            .map_err(LikeError::Unlike)?;
        return Ok(LikeToggle::Unliked);
    }

    let like = NewLike { post_id: post_id.clone(), user_id: session.user.id };
    backend
        .insert_like(&session.token, &like)
        .await
        .map_err(LikeError::Like)?;
    Ok(LikeToggle::Liked)
}

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;
