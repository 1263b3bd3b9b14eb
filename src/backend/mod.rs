//! Backend — the hosted data + auth service behind a trait seam.
//!
//! DESIGN
//! ======
//! All persistence, authentication, and query execution belong to the
//! hosted service. Every operation here is a single remote call; composition
//! (feed derivation, like toggling) lives in `services`. `SupabaseClient`
//! talks to the real service over HTTPS, tests swap in `MemoryBackend`.

#[cfg(test)]
pub mod memory;
pub mod supabase;
pub mod types;

pub use supabase::SupabaseClient;
pub use types::{AuthSession, BackendError, FeedRow, LikeRow, NewLike, NewPost, RowId, SessionUser};
use uuid::Uuid;

/// Remote operations consumed by the application.
///
/// Calls that act on behalf of a user take that user's access token so the
/// service can apply its row-level policies.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Exchange email + password for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    /// Trade a refresh token for a new session. Refresh tokens are single
    /// use; the returned session carries its replacement.
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError>;

    /// Resolve the principal behind an access token. `Ok(None)` when the
    /// token is unknown or expired.
    async fn get_user(&self, token: &str) -> Result<Option<SessionUser>, BackendError>;

    /// Invalidate the session behind an access token.
    async fn sign_out(&self, token: &str) -> Result<(), BackendError>;

    /// Read the `username` of the profile keyed by `user_id`.
    async fn fetch_profile_username(&self, token: &str, user_id: Uuid) -> Result<String, BackendError>;

    /// All posts with author username and like ids, newest first.
    async fn fetch_feed(&self, token: &str) -> Result<Vec<FeedRow>, BackendError>;

    async fn insert_post(&self, token: &str, post: &NewPost) -> Result<(), BackendError>;

    /// The like row for `(post_id, user_id)`, if exactly one exists.
    async fn find_like(&self, token: &str, post_id: &RowId, user_id: Uuid) -> Result<Option<LikeRow>, BackendError>;

    async fn delete_like(&self, token: &str, like_id: &RowId) -> Result<(), BackendError>;

    async fn insert_like(&self, token: &str, like: &NewLike) -> Result<(), BackendError>;

    /// Toggle a like with one server-side function call. Returns `true`
    /// when the post is liked afterwards.
    async fn toggle_like_rpc(&self, token: &str, function: &str, post_id: &RowId) -> Result<bool, BackendError>;
}
