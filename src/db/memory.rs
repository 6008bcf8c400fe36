use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::{
    DbError, ProfileRepository, RoomRepository, SessionRepository, UserRepository,
    USERS_EMAIL_KEY, USERS_USERNAME_KEY,
};
use crate::models::{NewRoom, NewUser, Profile, Room, SessionRecord, User};

/// In-process store with the same uniqueness rules as the SQL schema.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    profiles: Vec<Profile>,
    rooms: Vec<Room>,
    sessions: HashMap<String, SessionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Every write leaves the tables consistent, so a poisoned lock is safe to reuse.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_account(
        &self,
        new_user: &NewUser,
        handle: &str,
    ) -> Result<(User, Profile), DbError> {
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.email == new_user.email) {
            return Err(DbError::UniqueViolation(USERS_EMAIL_KEY.to_string()));
        }
        if tables.users.iter().any(|u| u.username.as_deref() == Some(handle)) {
            return Err(DbError::UniqueViolation(USERS_USERNAME_KEY.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: new_user.email.clone(),
            username: Some(handle.to_string()),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            password_hash: new_user.password_hash.clone(),
            is_verified: false,
            is_staff: false,
            date_joined: now,
        };
        let profile = Profile {
            id: Uuid::now_v7(),
            user_id: user.id,
            avatar: None,
            bio: String::new(),
            github: String::new(),
            linkedin: String::new(),
            is_moderator: false,
            date_joined: now,
        };
        tables.users.push(user.clone());
        tables.profiles.push(profile.clone());
        Ok((user, profile))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DbError> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DbError> {
        let mut tables = self.tables();
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn count_profiles_for_user(&self, user_id: Uuid) -> Result<i64, DbError> {
        let count = self
            .tables()
            .profiles
            .iter()
            .filter(|p| p.user_id == user_id)
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl RoomRepository for MemoryStore {
    async fn create_room(&self, new_room: &NewRoom) -> Result<Room, DbError> {
        let now = Utc::now();
        let room = Room {
            id: Uuid::now_v7(),
            name: new_room.name.clone(),
            description: new_room.description.clone(),
            creator_id: new_room.creator_id,
            is_public: new_room.is_public,
            room_profile: new_room.room_profile.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables().rooms.push(room.clone());
        Ok(room)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, DbError> {
        let mut rooms = self.tables().rooms.clone();
        rooms.reverse();
        Ok(rooms)
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn load_session(&self, session_key: &str) -> Result<Option<SessionRecord>, DbError> {
        let now = Utc::now();
        Ok(self
            .tables()
            .sessions
            .get(session_key)
            .filter(|s| s.expires_at > now)
            .cloned())
    }

    async fn save_session(
        &self,
        session_key: &str,
        data: &serde_json::Map<String, serde_json::Value>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        self.tables().sessions.insert(
            session_key.to_string(),
            SessionRecord {
                session_key: session_key.to_string(),
                data: Json(data.clone()),
                expires_at,
            },
        );
        Ok(())
    }

    async fn purge_expired_sessions(&self) -> Result<u64, DbError> {
        let now = Utc::now();
        let mut tables = self.tables();
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - tables.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let store = MemoryStore::new();
        store.create_account(&new_user("ada@test.com"), "#000000a100").await.unwrap();

        let err = store
            .create_account(&new_user("ada@test.com"), "#000000b200")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(ref c) if c == USERS_EMAIL_KEY));
    }

    #[tokio::test]
    async fn handle_collision_leaves_nothing_behind() {
        let store = MemoryStore::new();
        let (first, _) = store
            .create_account(&new_user("ada@test.com"), "#000000a100")
            .await
            .unwrap();

        let err = store
            .create_account(&new_user("grace@test.com"), "#000000a100")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(ref c) if c == USERS_USERNAME_KEY));
        assert!(store.find_user_by_email("grace@test.com").await.unwrap().is_none());
        assert_eq!(store.tables().profiles.len(), 1);
        assert_eq!(store.count_profiles_for_user(first.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn expired_sessions_are_invisible_and_purged() {
        let store = MemoryStore::new();
        let data = serde_json::Map::new();
        store
            .save_session("old", &data, Utc::now() - chrono::Duration::seconds(1))
            .await
            .unwrap();
        store
            .save_session("live", &data, Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();

        assert!(store.load_session("old").await.unwrap().is_none());
        assert!(store.load_session("live").await.unwrap().is_some());
        assert_eq!(store.purge_expired_sessions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rooms_list_newest_first() {
        let store = MemoryStore::new();
        let creator = Uuid::now_v7();
        for name in ["first", "second"] {
            store
                .create_room(&NewRoom {
                    name: name.to_string(),
                    description: String::new(),
                    creator_id: creator,
                    is_public: true,
                    room_profile: None,
                })
                .await
                .unwrap();
        }

        let names: Vec<_> = store
            .list_rooms()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }
}
