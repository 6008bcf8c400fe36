use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::{NewRoom, Room};
use crate::routes::MessageResponse;
use crate::state::SharedState;
use crate::validation::FieldErrors;

const NAME_MAX: usize = 100;

#[derive(Deserialize)]
pub struct CreateRoom {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub room_profile: Option<String>,
}

#[derive(Serialize)]
pub struct RoomList {
    pub rooms: Vec<Room>,
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateRoom>, AppError>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let mut errors = FieldErrors::new();
    let name = errors.required("name", &req.name);
    errors.max_length("name", name, NAME_MAX);
    let description = errors.required("description", &req.description);

    let (Some(name), Some(description)) = (name, description) else {
        return Err(AppError::Validation(errors));
    };
    errors.into_result().map_err(AppError::Validation)?;

    // The token may outlive the account
    state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    let room = state
        .store
        .create_room(&NewRoom {
            name: name.trim().to_string(),
            description: description.to_string(),
            creator_id: auth.user_id,
            is_public: req.is_public.unwrap_or(true),
            room_profile: req.room_profile.filter(|p| !p.trim().is_empty()),
        })
        .await?;

    tracing::info!(room_id = %room.id, creator = %auth.user_id, "Room created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "Room {} created successfully",
            room.name
        ))),
    ))
}

pub async fn list(State(state): State<SharedState>) -> Result<Json<RoomList>, AppError> {
    let rooms = state.store.list_rooms().await?;
    Ok(Json(RoomList { rooms }))
}
