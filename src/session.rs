//! Server-side sessions keyed by the `sessionid` cookie.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::Store;
use crate::error::AppError;
use crate::state::SharedState;

pub const SESSION_COOKIE: &str = "sessionid";

/// Session data for the current request. Unknown or expired keys yield a fresh,
/// empty session under a new key. Changes are only persisted by [`Session::save`].
#[derive(Debug, Clone)]
pub struct Session {
    key: String,
    data: Map<String, Value>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            key: generate_session_key(),
            data: Map::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.data
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn insert<T: Serialize>(&mut self, name: &str, value: T) -> Result<(), AppError> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::Internal(format!("Session value not serializable: {e}")))?;
        self.data.insert(name.to_string(), value);
        Ok(())
    }

    /// Persist the session, extend its expiry and return the cookie to send back.
    pub async fn save(self, store: &dyn Store, ttl: Duration) -> Result<CookieJar, AppError> {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Internal("Session lifetime out of range".to_string()))?;
        store.save_session(&self.key, &self.data, expires_at).await?;

        let cookie = Cookie::build((SESSION_COOKIE, self.key))
            .path("/")
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(ttl.num_seconds()))
            .build();

        Ok(CookieJar::new().add(cookie))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl FromRequestParts<SharedState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            if let Some(record) = state.store.load_session(cookie.value()).await? {
                return Ok(Session {
                    key: record.session_key,
                    data: record.data.0,
                });
            }
        }

        Ok(Session::new())
    }
}

fn generate_session_key() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}
