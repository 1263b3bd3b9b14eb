//! In-memory `Backend` used by service and route tests.
//!
//! Mirrors the hosted service closely enough for the behaviors the app
//! relies on: newest-first feed ordering, joined usernames and like ids,
//! single-row like lookup, and token-scoped sessions with single-use refresh
//! tokens. Every call is recorded and any operation can be forced to fail.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::Backend;
use super::types::{AuthSession, AuthorRef, BackendError, FeedRow, LikeRow, NewLike, NewPost, RowId, SessionUser};

#[derive(Debug, Clone)]
pub struct StoredPost {
    pub id: RowId,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredLike {
    pub id: RowId,
    pub post_id: RowId,
    pub user_id: Uuid,
}

#[derive(Default)]
struct Store {
    /// access token -> user
    sessions: HashMap<String, SessionUser>,
    /// email -> (password, user id)
    credentials: HashMap<String, (String, Uuid)>,
    /// refresh token -> user
    refresh_tokens: HashMap<String, SessionUser>,
    profiles: HashMap<Uuid, String>,
    posts: Vec<StoredPost>,
    likes: Vec<StoredLike>,
    calls: Vec<&'static str>,
    failing: HashSet<&'static str>,
    next_id: u64,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> RowId {
        self.next_id += 1;
        RowId::new(format!("{prefix}{}", self.next_id))
    }

    fn record(&mut self, op: &'static str) -> Result<(), BackendError> {
        self.calls.push(op);
        if self.failing.contains(op) {
            return Err(BackendError::Api { status: 500, code: None, message: format!("{op} failed") });
        }
        Ok(())
    }

    /// Issue a fresh access + refresh token pair for `user`.
    fn issue_session(&mut self, user: SessionUser) -> AuthSession {
        let access_token = format!("token-{}", Uuid::new_v4());
        let refresh_token = format!("refresh-{}", Uuid::new_v4());
        self.sessions.insert(access_token.clone(), user.clone());
        self.refresh_tokens.insert(refresh_token.clone(), user.clone());
        AuthSession { access_token, refresh_token: Some(refresh_token), user }
    }

    fn authorize(&self, token: &str) -> Result<&SessionUser, BackendError> {
        self.sessions
            .get(token)
            .ok_or_else(|| BackendError::Api { status: 401, code: None, message: "invalid JWT".into() })
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    store: Mutex<Store>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with a profile and an active session token.
    pub fn add_user(&self, token: &str, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        let mut store = self.store.lock().unwrap();
        store
            .sessions
            .insert(token.to_owned(), SessionUser { id, email: Some(format!("{username}@example.com")) });
        store.profiles.insert(id, username.to_owned());
        id
    }

    /// Register sign-in credentials for an existing user.
    pub fn add_credentials(&self, email: &str, password: &str, user_id: Uuid) {
        let mut store = self.store.lock().unwrap();
        store
            .credentials
            .insert(email.to_owned(), (password.to_owned(), user_id));
    }

    /// Register a refresh token for the user behind an existing access token.
    pub fn add_refresh_token(&self, access_token: &str, refresh_token: &str) {
        let mut store = self.store.lock().unwrap();
        let user = store.sessions[access_token].clone();
        store.refresh_tokens.insert(refresh_token.to_owned(), user);
    }

    /// Insert a post created `minutes_ago` minutes before now.
    pub fn seed_post(&self, user_id: Uuid, content: &str, minutes_ago: i64) -> RowId {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id("p");
        store.posts.push(StoredPost {
            id: id.clone(),
            user_id,
            content: content.to_owned(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        });
        id
    }

    /// Insert a like row directly, bypassing the toggle flow.
    pub fn seed_like(&self, post_id: &RowId, user_id: Uuid) -> RowId {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id("l");
        store
            .likes
            .push(StoredLike { id: id.clone(), post_id: post_id.clone(), user_id });
        id
    }

    /// Drop a session, as if it expired on the service side.
    pub fn revoke(&self, token: &str) {
        self.store.lock().unwrap().sessions.remove(token);
    }

    /// Make every later call of `op` fail with a 500.
    pub fn fail_on(&self, op: &'static str) {
        self.store.lock().unwrap().failing.insert(op);
    }

    #[must_use]
    pub fn posts(&self) -> Vec<StoredPost> {
        self.store.lock().unwrap().posts.clone()
    }

    /// Number of like rows for `(post_id, user_id)`.
    #[must_use]
    pub fn like_rows(&self, post_id: &RowId, user_id: Uuid) -> usize {
        let store = self.store.lock().unwrap();
        store
            .likes
            .iter()
            .filter(|l| &l.post_id == post_id && l.user_id == user_id)
            .count()
    }

    /// Number of recorded calls of `op`.
    #[must_use]
    pub fn call_count(&self, op: &str) -> usize {
        let store = self.store.lock().unwrap();
        store.calls.iter().filter(|c| **c == op).count()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.store.lock().unwrap().calls.clone()
    }
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let mut store = self.store.lock().unwrap();
        store.record("sign_in_with_password")?;
        let user_id = match store.credentials.get(email) {
            Some((expected, user_id)) if expected == password => *user_id,
            _ => {
                return Err(BackendError::Api {
                    status: 400,
                    code: Some("invalid_credentials".into()),
                    message: "Invalid login credentials".into(),
                });
            }
        };
        Ok(store.issue_session(SessionUser { id: user_id, email: Some(email.to_owned()) }))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        let mut store = self.store.lock().unwrap();
        store.record("refresh_session")?;
        let user = store
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| BackendError::Api {
                status: 400,
                code: Some("refresh_token_not_found".into()),
                message: "Invalid Refresh Token: Refresh Token Not Found".into(),
            })?;
        Ok(store.issue_session(user))
    }

    async fn get_user(&self, token: &str) -> Result<Option<SessionUser>, BackendError> {
        let mut store = self.store.lock().unwrap();
        store.record("get_user")?;
        Ok(store.sessions.get(token).cloned())
    }

    async fn sign_out(&self, token: &str) -> Result<(), BackendError> {
        let mut store = self.store.lock().unwrap();
        store.record("sign_out")?;
        store.sessions.remove(token);
        Ok(())
    }

    async fn fetch_profile_username(&self, token: &str, user_id: Uuid) -> Result<String, BackendError> {
        let mut store = self.store.lock().unwrap();
        store.record("fetch_profile_username")?;
        store.authorize(token)?;
        store
            .profiles
            .get(&user_id)
            .cloned()
            .ok_or_else(|| BackendError::Api {
                status: 406,
                code: Some(super::types::NO_ROWS_CODE.into()),
                message: "JSON object requested, multiple (or no) rows returned".into(),
            })
    }

    async fn fetch_feed(&self, token: &str) -> Result<Vec<FeedRow>, BackendError> {
        let mut store = self.store.lock().unwrap();
        store.record("fetch_feed")?;
        store.authorize(token)?;

        let mut posts = store.posts.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(posts
            .into_iter()
            .map(|post| FeedRow {
                profiles: store
                    .profiles
                    .get(&post.user_id)
                    .map(|username| AuthorRef { username: username.clone() }),
                likes: Some(
                    store
                        .likes
                        .iter()
                        .filter(|l| l.post_id == post.id)
                        .map(|l| LikeRow { id: l.id.clone() })
                        .collect(),
                ),
                id: post.id,
                content: post.content,
                created_at: post.created_at,
            })
            .collect())
    }

    async fn insert_post(&self, token: &str, post: &NewPost) -> Result<(), BackendError> {
        let mut store = self.store.lock().unwrap();
        store.record("insert_post")?;
        store.authorize(token)?;
        let id = store.next_id("p");
        store.posts.push(StoredPost {
            id,
            user_id: post.user_id,
            content: post.content.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn find_like(&self, token: &str, post_id: &RowId, user_id: Uuid) -> Result<Option<LikeRow>, BackendError> {
        // Yield like a network round trip would, so unserialized toggles can interleave.
        tokio::task::yield_now().await;
        let mut store = self.store.lock().unwrap();
        store.record("find_like")?;
        store.authorize(token)?;
        let matches: Vec<&StoredLike> = store
            .likes
            .iter()
            .filter(|l| &l.post_id == post_id && l.user_id == user_id)
            .collect();
        // Single-object semantics: zero or several rows both read as "none".
        match matches.as_slice() {
            [only] => Ok(Some(LikeRow { id: only.id.clone() })),
            _ => Ok(None),
        }
    }

    async fn delete_like(&self, token: &str, like_id: &RowId) -> Result<(), BackendError> {
        let mut store = self.store.lock().unwrap();
        store.record("delete_like")?;
        store.authorize(token)?;
        store.likes.retain(|l| &l.id != like_id);
        Ok(())
    }

    async fn insert_like(&self, token: &str, like: &NewLike) -> Result<(), BackendError> {
        let mut store = self.store.lock().unwrap();
        store.record("insert_like")?;
        store.authorize(token)?;
        let id = store.next_id("l");
        store
            .likes
            .push(StoredLike { id, post_id: like.post_id.clone(), user_id: like.user_id });
        Ok(())
    }

    async fn toggle_like_rpc(&self, token: &str, function: &str, post_id: &RowId) -> Result<bool, BackendError> {
        let mut store = self.store.lock().unwrap();
        store.record("toggle_like_rpc")?;
        if function != "toggle_like" {
            return Err(BackendError::Api {
                status: 404,
                code: Some("PGRST202".into()),
                message: format!("Could not find the function public.{function}"),
            });
        }
        let user_id = store.authorize(token)?.id;
        let before = store.likes.len();
        store
            .likes
            .retain(|l| !(&l.post_id == post_id && l.user_id == user_id));
        if store.likes.len() < before {
            return Ok(false);
        }
        let id = store.next_id("l");
        store
            .likes
            .push(StoredLike { id, post_id: post_id.clone(), user_id });
        Ok(true)
    }
}
