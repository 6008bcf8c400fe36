use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{
    profiles, rooms, sessions, users, DbError, ProfileRepository, RoomRepository,
    SessionRepository, UserRepository,
};
use crate::models::{NewRoom, NewUser, Profile, Room, SessionRecord, User};

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_account(
        &self,
        new_user: &NewUser,
        handle: &str,
    ) -> Result<(User, Profile), DbError> {
        let mut tx = self.pool.begin().await?;
        let user = users::create(&mut *tx, new_user, handle).await?;
        let profile = profiles::create(&mut *tx, user.id).await?;
        tx.commit().await?;
        Ok((user, profile))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DbError> {
        Ok(users::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        Ok(users::find_by_email(&self.pool, email).await?)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DbError> {
        Ok(users::update_password(&self.pool, id, password_hash).await?)
    }
}

#[async_trait]
impl ProfileRepository for PgStore {
    async fn count_profiles_for_user(&self, user_id: Uuid) -> Result<i64, DbError> {
        Ok(profiles::count_for_user(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl RoomRepository for PgStore {
    async fn create_room(&self, new_room: &NewRoom) -> Result<Room, DbError> {
        Ok(rooms::create(&self.pool, new_room).await?)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, DbError> {
        Ok(rooms::list(&self.pool).await?)
    }
}

#[async_trait]
impl SessionRepository for PgStore {
    async fn load_session(&self, session_key: &str) -> Result<Option<SessionRecord>, DbError> {
        Ok(sessions::find_live(&self.pool, session_key).await?)
    }

    async fn save_session(
        &self,
        session_key: &str,
        data: &serde_json::Map<String, serde_json::Value>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        Ok(sessions::upsert(&self.pool, session_key, data, expires_at).await?)
    }

    async fn purge_expired_sessions(&self) -> Result<u64, DbError> {
        Ok(sessions::delete_expired(&self.pool).await?)
    }
}
