use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_key: String,
    pub data: Json<serde_json::Map<String, serde_json::Value>>,
    pub expires_at: DateTime<Utc>,
}
