//! Account lifecycle: registration, provisioning and password reset.

pub mod password_reset;
pub mod provisioning;

use crate::auth::password;
use crate::db::{DbError, Store, USERS_EMAIL_KEY};
use crate::error::AppError;
use crate::models::{NewUser, User};

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
}

/// Create a user and provision it (handle + profile) in one step.
pub async fn register(store: &dyn Store, account: NewAccount<'_>) -> Result<User, AppError> {
    if account.first_name.trim().is_empty() && account.last_name.trim().is_empty() {
        return Err(AppError::non_field("Users must have a first and last name"));
    }

    let password_hash = password::hash(account.password).map_err(AppError::Internal)?;

    let new_user = NewUser {
        email: normalize_email(account.email),
        first_name: account.first_name.trim().to_string(),
        last_name: account.last_name.trim().to_string(),
        password_hash,
    };

    let provisioned = provisioning::provision_new_user(store, &new_user)
        .await
        .map_err(|e| match e {
            DbError::UniqueViolation(constraint) if constraint == USERS_EMAIL_KEY => {
                AppError::field("email", "user with this email already exists.")
            }
            other => AppError::Database(other),
        })?;
    tracing::info!(user_id = %provisioned.user.id, "User registered");

    Ok(provisioned.user)
}

/// Lowercase the domain part; the local part is case sensitive.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}
