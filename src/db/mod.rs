//! Persistence layer.
//!
//! Each entity has a repository trait. [`PgStore`] implements them on top of the
//! per-table query modules below; [`MemoryStore`] keeps everything in process
//! and backs the test suite.

pub mod memory;
pub mod postgres;
pub mod profiles;
pub mod rooms;
pub mod sessions;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{NewRoom, NewUser, Profile, Room, SessionRecord, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug)]
pub enum DbError {
    /// A unique constraint rejected the write. Carries the constraint name when known.
    UniqueViolation(String),
    NotFound,
    Sqlx(sqlx::Error),
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::UniqueViolation(constraint) => {
                write!(f, "Unique constraint violated: {constraint}")
            }
            DbError::NotFound => write!(f, "Row not found"),
            DbError::Sqlx(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DbError {}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                DbError::UniqueViolation(db_err.constraint().unwrap_or_default().to_string())
            }
            other => DbError::Sqlx(other),
        }
    }
}

/// Unique constraint on `users.email`.
pub const USERS_EMAIL_KEY: &str = "users_email_key";
/// Unique constraint on `users.username`.
pub const USERS_USERNAME_KEY: &str = "users_username_key";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the user with its handle and its profile. All or nothing: on
    /// error no row is left behind.
    async fn create_account(
        &self,
        new_user: &NewUser,
        handle: &str,
    ) -> Result<(User, Profile), DbError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DbError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DbError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn count_profiles_for_user(&self, user_id: Uuid) -> Result<i64, DbError>;
}

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create_room(&self, new_room: &NewRoom) -> Result<Room, DbError>;
    async fn list_rooms(&self) -> Result<Vec<Room>, DbError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Returns the session only if it has not expired.
    async fn load_session(&self, session_key: &str) -> Result<Option<SessionRecord>, DbError>;
    async fn save_session(
        &self,
        session_key: &str,
        data: &serde_json::Map<String, serde_json::Value>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbError>;
    /// Deletes expired sessions, returning how many were removed.
    async fn purge_expired_sessions(&self) -> Result<u64, DbError>;
}

/// Everything the application needs from persistence.
pub trait Store: UserRepository + ProfileRepository + RoomRepository + SessionRepository {}

impl<T> Store for T where T: UserRepository + ProfileRepository + RoomRepository + SessionRepository {}
