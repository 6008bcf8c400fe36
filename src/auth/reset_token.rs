//! Stateless password-reset credentials.
//!
//! A reset token is an HS256 JWT scoped to the `password-reset` audience. Besides
//! the user id and the expiry it carries a fingerprint of the user's password hash
//! at issue time, so it stops validating as soon as the password changes. Nothing
//! is stored server side.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::models::User;

const AUDIENCE: &str = "password-reset";

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: Uuid,
    /// Fingerprint of the password hash the token was issued against.
    pwd: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
pub struct ResetTokenGenerator {
    secret: String,
    timeout: Duration,
}

impl ResetTokenGenerator {
    pub fn new(secret: impl Into<String>, timeout: Duration) -> Self {
        Self {
            secret: secret.into(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn make_token(&self, user: &User) -> Result<String, String> {
        self.make_token_at(user, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`.
    pub fn make_token_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, String> {
        let expires_at = issued_at
            .checked_add_signed(self.timeout)
            .ok_or_else(|| "Reset token expiry out of range".to_string())?;
        let claims = ResetClaims {
            sub: user.id,
            pwd: password_fingerprint(&user.password_hash),
            aud: AUDIENCE.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| format!("Reset token encode failed: {e}"))
    }

    /// True if `token` was issued for `user`, has not expired, and the user's
    /// password has not changed since.
    pub fn check_token(&self, user: &User, token: &str) -> bool {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "aud", "sub"]);

        let claims = match decode::<ResetClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("Rejected reset token: {e}");
                return false;
            }
        };

        if claims.sub != user.id {
            return false;
        }

        let current = password_fingerprint(&user.password_hash);
        claims.pwd.as_bytes().ct_eq(current.as_bytes()).into()
    }
}

fn password_fingerprint(password_hash: &str) -> String {
    let digest = Sha256::digest(password_hash.as_bytes());
    hex::encode(&digest[..16])
}

/// Encode a user id for use in reset links. Reversible, not secret.
pub fn encode_uid(id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

pub fn decode_uid(uid: &str) -> Option<Uuid> {
    let bytes = URL_SAFE_NO_PAD.decode(uid.trim()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    Uuid::parse_str(&text).ok()
}
