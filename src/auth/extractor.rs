use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::jwt;
use crate::error::AppError;
use crate::state::SharedState;

pub const ACCESS_COOKIE: &str = "access_token";

/// An authenticated caller. Extraction fails with 401 when no valid access token is present.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let secret = &state.config.jwt_secret;

        // Bearer token wins over the cookie
        if let Some(auth_header) = parts.headers.get("authorization") {
            let auth_str = auth_header.to_str().map_err(|_| unauthorized())?;
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let claims = jwt::decode_token(token, secret).map_err(|_| unauthorized())?;
                return Ok(AuthUser { user_id: claims.sub });
            }
        }

        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get(ACCESS_COOKIE) {
            let claims = jwt::decode_token(cookie.value(), secret).map_err(|_| unauthorized())?;
            return Ok(AuthUser { user_id: claims.sub });
        }

        Err(unauthorized())
    }
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("Unauthorized".to_string())
}
