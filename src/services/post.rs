//! Post composer service — validate and insert one post.
//!
//! No optimistic update: the new post appears once the feed is fetched again.

use super::session::Session;
use crate::backend::{Backend, BackendError, NewPost};
use crate::error::ErrorCode;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("You must be logged in to create a post.")]
    NotAuthenticated,
    #[error("Post content cannot be empty.")]
    EmptyContent,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl PostError {
    /// Text for the composer's inline error slot. Service rejections carry
    /// the backend's own message; transport and parse failures do not.
    #[must_use]
    pub fn inline_message(&self) -> String {
        match self {
            Self::Backend(BackendError::Api { message, .. }) => message.clone(),
            Self::Backend(_) => UNEXPECTED_ERROR.to_owned(),
            other => other.to_string(),
        }
    }
}

impl ErrorCode for PostError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "E_NOT_AUTHENTICATED",
            Self::EmptyContent => "E_EMPTY_CONTENT",
            Self::Backend(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Backend(e) if e.retryable())
    }
}

/// Insert `{user_id, content}` for the signed-in user.
///
/// # Errors
///
/// [`PostError::NotAuthenticated`] or [`PostError::EmptyContent`] without any
/// remote call; otherwise the backend's insert error.
pub async fn create_post(backend: &dyn Backend, session: Option<&Session>, content: &str) -> Result<(), PostError> {
    let session = session.ok_or(PostError::NotAuthenticated)?;
    if content.trim().is_empty() {
        return Err(PostError::EmptyContent);
    }

    let post = NewPost { user_id: session.user.id, content: content.to_owned() };
    backend.insert_post(&session.token, &post).await?;

    tracing::info!(user_id = %session.user.id, len = content.len(), "post created");
    Ok(())
}

#[cfg(test)]
#[path = "post_test.rs"]
mod tests;
