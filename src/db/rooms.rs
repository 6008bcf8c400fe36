use sqlx::PgPool;

use crate::models::{NewRoom, Room};

pub async fn create(pool: &PgPool, new_room: &NewRoom) -> Result<Room, sqlx::Error> {
    sqlx::query_as::<_, Room>(
        "INSERT INTO rooms (name, description, creator_id, is_public, room_profile)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&new_room.name)
    .bind(&new_room.description)
    .bind(new_room.creator_id)
    .bind(new_room.is_public)
    .bind(&new_room.room_profile)
    .fetch_one(pool)
    .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>("SELECT * FROM rooms ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}
