pub mod accounts;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod housekeeping;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::reset_token::ResetTokenGenerator;
use crate::config::Config;
use crate::db::Store;
use crate::email::{LogMailer, Mailer, SystemMailer};
use crate::rate_limit::AttemptLimiter;
use crate::state::{AppState, SharedState};

/// Pick the mailer for this configuration: SMTP when configured and usable,
/// otherwise mail goes to the log.
pub fn mailer_from_config(config: &Config) -> Arc<dyn Mailer> {
    match config.smtp.as_ref().map(SystemMailer::new) {
        Some(Ok(mailer)) => {
            tracing::info!("System SMTP configured");
            Arc::new(mailer)
        }
        Some(Err(e)) => {
            tracing::warn!("System SMTP not available: {e}");
            Arc::new(LogMailer)
        }
        None => Arc::new(LogMailer),
    }
}

pub fn build_state(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, config: Config) -> SharedState {
    let reset_tokens = ResetTokenGenerator::new(config.jwt_secret.clone(), config.reset_timeout);

    Arc::new(AppState {
        store,
        config,
        mailer,
        reset_tokens,
        login_limiter: AttemptLimiter::for_login(),
        reset_limiter: AttemptLimiter::for_password_reset(),
    })
}

pub fn build_app(state: SharedState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
