//! Backend types — rows, payloads, and errors exchanged with the hosted
//! data + auth service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ErrorCode;

/// PostgREST code for "single object requested, zero or many rows returned".
pub const NO_ROWS_CODE: &str = "PGRST116";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request could not be sent or its body not read.
    #[error("backend request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status. Displays the
    /// service's own message so it can be shown to users verbatim.
    #[error("{message}")]
    Api { status: u16, code: Option<String>, message: String },

    /// The response body could not be deserialized.
    #[error("backend response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl BackendError {
    /// True when a single-row read matched no row.
    #[must_use]
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::Api { code: Some(code), .. } if code == NO_ROWS_CODE)
    }
}

impl ErrorCode for BackendError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_BACKEND_REQUEST",
            Self::Api { .. } => "E_BACKEND_API",
            Self::Parse(_) => "E_BACKEND_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Api { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// IDS
// =============================================================================

/// Primary key of a data row. Accepts either a string (uuid) or an integer
/// key on the wire and is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RowId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Int(n) => Self(n.to_string()),
        })
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// Authenticated principal as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens issued by a successful sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: SessionUser,
}

// =============================================================================
// DATA ROWS
// =============================================================================

/// One `posts` row joined with its author's username and like ids.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedRow {
    pub id: RowId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub profiles: Option<AuthorRef>,
    #[serde(default)]
    pub likes: Option<Vec<LikeRow>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorRef {
    pub username: String,
}

/// A `likes` row reduced to its key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LikeRow {
    pub id: RowId,
}

/// Insert payload for `posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub user_id: Uuid,
    pub content: String,
}

/// Insert payload for `likes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLike {
    pub post_id: RowId,
    pub user_id: Uuid,
}
