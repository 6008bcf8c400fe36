use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::SessionRecord;

pub async fn find_live(pool: &PgPool, session_key: &str) -> Result<Option<SessionRecord>, sqlx::Error> {
    sqlx::query_as::<_, SessionRecord>(
        "SELECT * FROM sessions WHERE session_key = $1 AND expires_at > now()",
    )
    .bind(session_key)
    .fetch_optional(pool)
    .await
}

pub async fn upsert(
    pool: &PgPool,
    session_key: &str,
    data: &serde_json::Map<String, serde_json::Value>,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO sessions (session_key, data, expires_at) VALUES ($1, $2, $3)
         ON CONFLICT (session_key) DO UPDATE SET data = EXCLUDED.data, expires_at = EXCLUDED.expires_at",
    )
    .bind(session_key)
    .bind(Json(data))
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
