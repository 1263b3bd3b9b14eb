mod backend;
mod config;
mod error;
mod routes;
mod services;
mod state;
mod views;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::error::ErrorCode;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "invalid configuration");
            std::process::exit(1);
        }
    };

    let backend = match backend::SupabaseClient::new(&config.backend) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "backend client init failed");
            std::process::exit(1);
        }
    };
    if let Some(function) = &config.like_toggle_rpc {
        tracing::info!(%function, "like toggles use server-side function");
    }

    let state = state::AppState::new(Arc::new(backend), &config);
    let app = routes::app(state);

    let port = config.port;
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %port, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%port, backend = %config.backend.url, "feedboard listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
    }
}
