use axum::extract::State;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::routes::MessageResponse;
use crate::session::Session;
use crate::state::SharedState;

const VISITS_KEY: &str = "visits";

#[derive(Serialize)]
pub struct VisitsResponse {
    pub visits: i64,
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<MessageResponse>, AppError> {
    let user = state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    Ok(Json(MessageResponse::new(format!(
        "user {}. Your email is {}",
        user.username.unwrap_or_default(),
        user.email
    ))))
}

/// Count visits per session. Read-then-write, so concurrent requests on one
/// session may undercount.
pub async fn visits_count(
    State(state): State<SharedState>,
    mut session: Session,
) -> Result<(CookieJar, Json<VisitsResponse>), AppError> {
    let visits = session.get::<i64>(VISITS_KEY).unwrap_or(0) + 1;
    session.insert(VISITS_KEY, visits)?;

    let jar = session
        .save(state.store.as_ref(), state.config.session_ttl)
        .await?;

    Ok((jar, Json(VisitsResponse { visits })))
}
