use sqlx::{Sqlite, SqlitePool};

use crate::data_formats::CreateTopicRequest;
use crate::errors::RequestError;
use crate::models::Topic;

use super::{is_foreign_key_violation, is_unique_violation};

pub async fn list_topics_in_db(pool: &SqlitePool) -> Result<Vec<Topic>, RequestError> {
    let mut tx = pool.begin().await?;
    let topics = sqlx::query_as::<Sqlite, Topic>("SELECT slug, description FROM topics")
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(topics)
}

pub async fn insert_topic_in_db(
    pool: &SqlitePool,
    CreateTopicRequest { slug, description }: CreateTopicRequest,
) -> Result<Topic, RequestError> {
    let mut tx = pool.begin().await?;
    let topic = sqlx::query_as::<Sqlite, Topic>(
        r#"INSERT INTO topics (slug, description)
        VALUES ($1, $2)
        RETURNING slug, description"#,
    )
    .bind(slug)
    .bind(description)
    .fetch_one(&mut tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            RequestError::Conflict("Topic already exists")
        } else {
            RequestError::DatabaseError(e)
        }
    })?;
    tx.commit().await?;

    Ok(topic)
}

// Topics still referenced by articles cannot be removed.
pub async fn delete_topic_in_db(pool: &SqlitePool, slug: &str) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM topics WHERE slug = $1")
        .bind(slug)
        .execute(&mut tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                RequestError::Conflict("Topic still has articles")
            } else {
                RequestError::DatabaseError(e)
            }
        })?;
    tx.commit().await?;

    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Topic not found"));
    }
    Ok(())
}
