use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::{CookieJar, WithRejection};
use serde::{Deserialize, Serialize};

use crate::accounts::password_reset::{ConfirmReset, PasswordResetService};
use crate::accounts::{self, normalize_email, NewAccount};
use crate::auth::extractor::ACCESS_COOKIE;
use crate::auth::jwt::{encode_token, Claims, ACCESS_TOKEN_MINUTES};
use crate::auth::password;
use crate::error::AppError;
use crate::models::User;
use crate::routes::MessageResponse;
use crate::state::SharedState;
use crate::validation::FieldErrors;

const MIN_PASSWORD_LEN: usize = 8;
const EMAIL_MAX: usize = 255;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct PasswordResetRequest {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub uid: Option<String>,
    pub token: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
}

fn access_cookie(access_token: &str) -> CookieJar {
    let access = Cookie::build((ACCESS_COOKIE, access_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(ACCESS_TOKEN_MINUTES))
        .build();

    CookieJar::new().add(access)
}

pub async fn register(
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let mut errors = FieldErrors::new();
    let email = errors.required("email", &req.email);
    errors.email("email", email);
    errors.max_length("email", email, EMAIL_MAX);
    let password = errors.required("password", &req.password);
    errors.min_length("password", password, MIN_PASSWORD_LEN);
    let first_name = req.first_name.as_deref().unwrap_or_default();
    let last_name = req.last_name.as_deref().unwrap_or_default();
    errors.max_length("first_name", Some(first_name), 30);
    errors.max_length("last_name", Some(last_name), 30);

    let (Some(email), Some(password)) = (email, password) else {
        return Err(AppError::Validation(errors));
    };
    errors.into_result().map_err(AppError::Validation)?;

    let user = accounts::register(
        state.store.as_ref(),
        NewAccount {
            email,
            first_name,
            last_name,
            password,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    if state.login_limiter.check(&req.email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let Some(user) = state
        .store
        .find_user_by_email(&normalize_email(&req.email))
        .await?
    else {
        state.login_limiter.record(&req.email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record(&req.email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let access_token =
        encode_token(&Claims::new(user.id), &state.config.jwt_secret).map_err(AppError::Internal)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((access_cookie(&access_token), Json(AuthResponse { access_token })))
}

pub async fn password_reset(
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<PasswordResetRequest>, AppError>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut errors = FieldErrors::new();
    let email = errors.required("email", &req.email);
    errors.email("email", email);
    errors.max_length("email", email, EMAIL_MAX);
    let Some(email) = email else {
        return Err(AppError::Validation(errors));
    };
    errors.into_result().map_err(AppError::Validation)?;

    if state.reset_limiter.check(email).is_err() {
        return Err(AppError::RateLimited(
            "Too many password reset requests. Please try again later.".to_string(),
        ));
    }
    state.reset_limiter.record(email);

    PasswordResetService::from_state(&state)
        .request_reset(email)
        .await?;

    Ok(Json(MessageResponse::new(
        "Password reset link sent if email exists",
    )))
}

pub async fn password_reset_confirm(
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<PasswordResetConfirmRequest>, AppError>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut errors = FieldErrors::new();
    let uid = errors.required("uid", &req.uid);
    let token = errors.required("token", &req.token);
    let old_password = errors.required("old_password", &req.old_password);
    let new_password = errors.required("new_password", &req.new_password);
    errors.min_length("new_password", new_password, MIN_PASSWORD_LEN);
    let confirm_password = errors.required("confirm_password", &req.confirm_password);
    errors.min_length("confirm_password", confirm_password, MIN_PASSWORD_LEN);

    let (Some(uid), Some(token), Some(old_password), Some(new_password), Some(confirm_password)) =
        (uid, token, old_password, new_password, confirm_password)
    else {
        return Err(AppError::Validation(errors));
    };
    errors.into_result().map_err(AppError::Validation)?;

    PasswordResetService::from_state(&state)
        .confirm_reset(&ConfirmReset {
            uid,
            token,
            old_password,
            new_password,
            confirm_password,
        })
        .await?;

    Ok(Json(MessageResponse::new("Password reset successful")))
}
