use sqlx::{Sqlite, SqlitePool};

use crate::data_formats::CreateUserRequest;
use crate::errors::RequestError;
use crate::models::User;

use super::{is_foreign_key_violation, is_unique_violation};

pub async fn list_users_in_db(pool: &SqlitePool) -> Result<Vec<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let users = sqlx::query_as::<Sqlite, User>("SELECT username, name, avatar_url FROM users")
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(users)
}

pub async fn get_user_by_username_in_db(
    pool: &SqlitePool,
    username: &str,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<Sqlite, User>(
        "SELECT username, name, avatar_url FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(&mut tx)
    .await?;
    tx.commit().await?;

    user.ok_or(RequestError::NotFound("User not found"))
}

pub async fn insert_user_in_db(
    pool: &SqlitePool,
    CreateUserRequest {
        username,
        name,
        avatar_url,
    }: CreateUserRequest,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<Sqlite, User>(
        r#"INSERT INTO users (username, name, avatar_url)
        VALUES ($1, $2, $3)
        RETURNING username, name, avatar_url"#,
    )
    .bind(username)
    .bind(name)
    .bind(avatar_url)
    .fetch_one(&mut tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            RequestError::Conflict("Username already exists")
        } else {
            RequestError::DatabaseError(e)
        }
    })?;
    tx.commit().await?;

    Ok(user)
}

pub async fn delete_user_in_db(pool: &SqlitePool, username: &str) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(&mut tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                RequestError::Conflict("User still has articles or comments")
            } else {
                RequestError::DatabaseError(e)
            }
        })?;
    tx.commit().await?;

    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found"));
    }
    Ok(())
}
