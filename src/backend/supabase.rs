//! Supabase client — GoTrue (`/auth/v1`) and PostgREST (`/rest/v1`).
//!
//! Thin HTTP wrapper; each trait method is one request. Response parsing is
//! kept in free functions so it can be tested on canned bodies.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use uuid::Uuid;

use super::Backend;
use super::types::{AuthSession, BackendError, FeedRow, LikeRow, NewLike, NewPost, RowId, SessionUser};
use crate::config::BackendConfig;

const FEED_SELECT: &str = "id,content,created_at,profiles(username),likes(id)";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

// =============================================================================
// CLIENT
// =============================================================================

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(config.timeouts.connect_secs));
        if let Some(secs) = config.timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.url.clone(), anon_key: config.anon_key.clone() })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{path}", self.base_url)
    }

    /// Request carrying the project key, authorized as `token` (or anon).
    fn request(&self, method: Method, url: String, token: Option<&str>) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token.unwrap_or(&self.anon_key))
    }

    /// `POST /auth/v1/token?grant_type=...` with a JSON credential body.
    fn token_request(&self, grant_type: &str, body: &serde_json::Value) -> RequestBuilder {
        self.request(Method::POST, self.auth_url("token"), None)
            .query(&[("grant_type", grant_type)])
            .json(body)
    }
}

/// Send a request and return `(status, body)`.
async fn send(request: RequestBuilder) -> Result<(u16, String), BackendError> {
    let response = request
        .send()
        .await
        .map_err(|e| BackendError::Request(e.to_string()))?;
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| BackendError::Request(e.to_string()))?;
    Ok((status, text))
}

/// Send a request and return the body of a 2xx response.
async fn send_ok(request: RequestBuilder) -> Result<String, BackendError> {
    let (status, text) = send(request).await?;
    if (200..300).contains(&status) { Ok(text) } else { Err(parse_error(status, &text)) }
}

#[async_trait::async_trait]
impl Backend for SupabaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let request = self.token_request("password", &serde_json::json!({ "email": email, "password": password }));
        let body = send_ok(request).await?;
        parse_json(&body)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        let request = self.token_request("refresh_token", &serde_json::json!({ "refresh_token": refresh_token }));
        let body = send_ok(request).await?;
        parse_json(&body)
    }

    async fn get_user(&self, token: &str) -> Result<Option<SessionUser>, BackendError> {
        let request = self.request(Method::GET, self.auth_url("user"), Some(token));
        let (status, body) = send(request).await?;
        parse_user_response(status, &body)
    }

    async fn sign_out(&self, token: &str) -> Result<(), BackendError> {
        let request = self.request(Method::POST, self.auth_url("logout"), Some(token));
        send_ok(request).await.map(drop)
    }

    async fn fetch_profile_username(&self, token: &str, user_id: Uuid) -> Result<String, BackendError> {
        #[derive(Deserialize)]
        struct ProfileRow {
            username: String,
        }

        let request = self
            .request(Method::GET, self.rest_url("profiles"), Some(token))
            .header("Accept", SINGLE_OBJECT)
            .query(&[("select", "username".to_owned()), ("id", format!("eq.{user_id}"))]);
        let body = send_ok(request).await?;
        parse_json::<ProfileRow>(&body).map(|row| row.username)
    }

    async fn fetch_feed(&self, token: &str) -> Result<Vec<FeedRow>, BackendError> {
        let request = self
            .request(Method::GET, self.rest_url("posts"), Some(token))
            .query(&[("select", FEED_SELECT), ("order", "created_at.desc")]);
        let body = send_ok(request).await?;
        parse_json(&body)
    }

    async fn insert_post(&self, token: &str, post: &NewPost) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, self.rest_url("posts"), Some(token))
            .header("Prefer", "return=minimal")
            .json(&[post]);
        send_ok(request).await.map(drop)
    }

    async fn find_like(&self, token: &str, post_id: &RowId, user_id: Uuid) -> Result<Option<LikeRow>, BackendError> {
        let request = self
            .request(Method::GET, self.rest_url("likes"), Some(token))
            .header("Accept", SINGLE_OBJECT)
            .query(&[
                ("select", "id".to_owned()),
                ("post_id", format!("eq.{post_id}")),
                ("user_id", format!("eq.{user_id}")),
            ]);
        match send_ok(request).await {
            Ok(body) => parse_json(&body).map(Some),
            Err(e) if e.is_no_rows() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn delete_like(&self, token: &str, like_id: &RowId) -> Result<(), BackendError> {
        let request = self
            .request(Method::DELETE, self.rest_url("likes"), Some(token))
            .query(&[("id", format!("eq.{like_id}"))]);
        send_ok(request).await.map(drop)
    }

    async fn insert_like(&self, token: &str, like: &NewLike) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, self.rest_url("likes"), Some(token))
            .header("Prefer", "return=minimal")
            .json(&[like]);
        send_ok(request).await.map(drop)
    }

    async fn toggle_like_rpc(&self, token: &str, function: &str, post_id: &RowId) -> Result<bool, BackendError> {
        let request = self
            .request(Method::POST, self.rest_url(&format!("rpc/{function}")), Some(token))
            .json(&serde_json::json!({ "p_post_id": post_id }));
        let body = send_ok(request).await?;
        parse_json(&body)
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))
}

/// `GET /auth/v1/user`: 401/403 mean "no session", not a failure.
fn parse_user_response(status: u16, body: &str) -> Result<Option<SessionUser>, BackendError> {
    match status {
        200..=299 => parse_json(body).map(Some),
        401 | 403 => Ok(None),
        _ => Err(parse_error(status, body)),
    }
}

/// Error bodies differ between PostgREST (`code`, `message`) and GoTrue
/// (`error_code`, `msg`, or the older `error`, `error_description`).
#[derive(Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

fn parse_error(status: u16, body: &str) -> BackendError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    let code = match parsed.code {
        Some(serde_json::Value::String(code)) => Some(code),
        _ => None,
    }
    .or(parsed.error_code)
    .or_else(|| parsed.error.clone());

    let message = parsed
        .message
        .or(parsed.msg)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() { format!("HTTP {status}") } else { trimmed.to_owned() }
        });

    BackendError::Api { status, code, message }
}

#[cfg(test)]
#[path = "supabase_test.rs"]
mod tests;
