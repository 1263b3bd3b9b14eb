//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page is rendered on the server and every action is a plain HTML
//! form post answered with a redirect, so "navigate" in the app means an
//! HTTP redirect and "on mount" means "while handling the GET".

pub mod auth;
pub mod feed;
pub mod posts;

use axum::{Router, middleware};
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Landing route every signed-out redirect points at.
pub const LANDING: &str = "/";
pub const FEED: &str = "/feed";

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(LANDING, get(auth::landing))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route(FEED, get(feed::feed_page))
        .route("/feed/{post_id}/like", post(feed::toggle_like))
        .route("/create-post", get(posts::composer_page).post(posts::create_post))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn_with_state(state.clone(), auth::resolve_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
