//! Password reset by emailed link.
//!
//! A request looks the account up by email and mails a link carrying the encoded
//! user id and a reset token. Confirmation checks the token against the user's
//! *current* password hash, so once the password changes every outstanding token
//! for that user stops working. Nothing is persisted between the two steps.

use crate::accounts::normalize_email;
use crate::auth::password;
use crate::auth::reset_token::{decode_uid, encode_uid, ResetTokenGenerator};
use crate::db::{DbError, Store};
use crate::email::templates::{render_password_reset, PASSWORD_RESET_SUBJECT};
use crate::email::{Mailer, OutgoingEmail};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug)]
pub enum ResetError {
    NoSuchUser,
    InvalidUser,
    InvalidToken,
    PasswordMismatch,
    /// The mailer refused or failed to deliver the reset email.
    Delivery(String),
    Internal(String),
    Store(DbError),
}

impl std::fmt::Display for ResetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetError::NoSuchUser => write!(f, "User with this email does not exist."),
            ResetError::InvalidUser => write!(f, "Invalid user ID"),
            ResetError::InvalidToken => write!(f, "Invalid or expired token"),
            ResetError::PasswordMismatch => write!(f, "Passwords do not match"),
            ResetError::Delivery(msg) => write!(f, "Delivery failed: {msg}"),
            ResetError::Internal(msg) => write!(f, "{msg}"),
            ResetError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl From<DbError> for ResetError {
    fn from(err: DbError) -> Self {
        ResetError::Store(err)
    }
}

impl From<ResetError> for AppError {
    fn from(err: ResetError) -> Self {
        match err {
            ResetError::NoSuchUser => AppError::field("email", err.to_string()),
            ResetError::InvalidUser | ResetError::InvalidToken | ResetError::PasswordMismatch => {
                AppError::non_field(err.to_string())
            }
            ResetError::Delivery(msg) => AppError::EmailDelivery(msg),
            ResetError::Internal(msg) => AppError::Internal(msg),
            ResetError::Store(err) => AppError::Database(err),
        }
    }
}

/// Fields of a reset confirmation, already checked for presence and length.
#[derive(Debug, Clone)]
pub struct ConfirmReset<'a> {
    pub uid: &'a str,
    pub token: &'a str,
    /// Accepted but never compared with the stored hash: holding a valid token
    /// is what authorizes the change.
    pub old_password: &'a str,
    pub new_password: &'a str,
    pub confirm_password: &'a str,
}

pub struct PasswordResetService<'a> {
    store: &'a dyn Store,
    mailer: &'a dyn Mailer,
    tokens: &'a ResetTokenGenerator,
    base_url: &'a str,
}

impl<'a> PasswordResetService<'a> {
    pub fn new(
        store: &'a dyn Store,
        mailer: &'a dyn Mailer,
        tokens: &'a ResetTokenGenerator,
        base_url: &'a str,
    ) -> Self {
        Self {
            store,
            mailer,
            tokens,
            base_url,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(
            state.store.as_ref(),
            state.mailer.as_ref(),
            &state.reset_tokens,
            &state.config.base_url,
        )
    }

    /// Mail a reset link to the account registered under `email`.
    ///
    /// Unknown addresses are reported as [`ResetError::NoSuchUser`]. Delivery
    /// failures are returned, not logged and dropped.
    pub async fn request_reset(&self, email: &str) -> Result<(), ResetError> {
        let user = self
            .store
            .find_user_by_email(&normalize_email(email))
            .await?
            .ok_or(ResetError::NoSuchUser)?;

        let uid = encode_uid(user.id);
        let token = self
            .tokens
            .make_token(&user)
            .map_err(ResetError::Internal)?;
        let reset_url = format!("{}/reset-password/{uid}/{token}/", self.base_url);

        let html_body = render_password_reset(
            &reset_url,
            &uid,
            &token,
            self.tokens.timeout().num_hours(),
        );

        self.mailer
            .send(OutgoingEmail {
                to: user.email.clone(),
                subject: PASSWORD_RESET_SUBJECT.to_string(),
                html_body,
            })
            .await
            .map_err(ResetError::Delivery)?;

        tracing::info!(user_id = %user.id, "Password reset email sent");
        Ok(())
    }

    /// Replace the password of the user identified by `uid` if `token` is valid
    /// for them and both new password fields agree.
    pub async fn confirm_reset(&self, req: &ConfirmReset<'_>) -> Result<(), ResetError> {
        let user_id = decode_uid(req.uid).ok_or(ResetError::InvalidUser)?;
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(ResetError::InvalidUser)?;

        if !self.tokens.check_token(&user, req.token) {
            return Err(ResetError::InvalidToken);
        }

        if req.new_password != req.confirm_password {
            return Err(ResetError::PasswordMismatch);
        }

        let password_hash = password::hash(req.new_password).map_err(ResetError::Internal)?;
        self.store.update_password(user.id, &password_hash).await?;

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }
}
