use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewUser, User};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    new_user: &NewUser,
    username: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (email, username, first_name, last_name, password_hash)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&new_user.email)
    .bind(username)
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(&new_user.password_hash)
    .fetch_one(executor)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}
