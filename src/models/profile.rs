use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub avatar: Option<String>,
    pub bio: String,
    pub github: String,
    pub linkedin: String,
    pub is_moderator: bool,
    pub date_joined: DateTime<Utc>,
}
