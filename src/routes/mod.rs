pub mod auth;
pub mod rooms;
pub mod users;

use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Rooms
        .route("/create-room/", post(rooms::create))
        .route("/list-rooms/", get(rooms::list))
        // Users
        .route("/", get(users::me))
        .route("/me/", get(users::me))
        .route("/visits-count/", get(users::visits_count))
        // Accounts
        .route("/register/", post(auth::register))
        .route("/login/", post(auth::login))
        .route("/password-reset/", post(auth::password_reset))
        .route("/password-reset-confirm/", post(auth::password_reset_confirm))
}
