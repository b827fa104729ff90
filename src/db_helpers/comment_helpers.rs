use sqlx::{Sqlite, SqlitePool};

use crate::data_formats::CreateCommentRequest;
use crate::errors::RequestError;
use crate::models::Comment;

use super::is_foreign_key_violation;

pub async fn insert_comment_in_db(
    pool: &SqlitePool,
    article_id: i64,
    CreateCommentRequest { username, body }: CreateCommentRequest,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;
    let comment = sqlx::query_as::<Sqlite, Comment>(
        r#"INSERT INTO comments (body, author, article_id)
        VALUES ($1, $2, $3)
        RETURNING comment_id, body, author, article_id, created_at, votes"#,
    )
    .bind(body)
    .bind(username)
    .bind(article_id)
    .fetch_one(&mut tx)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            RequestError::NotFound("Article or user not found")
        } else {
            RequestError::DatabaseError(e)
        }
    })?;
    tx.commit().await?;

    Ok(comment)
}

// Applies a signed delta to the comment's vote counter, never an absolute set.
pub async fn update_comment_by_id_in_db(
    pool: &SqlitePool,
    comment_id: i64,
    inc_votes: i64,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;
    let comment = sqlx::query_as::<Sqlite, Comment>(
        r#"UPDATE comments SET votes = votes + $1
        WHERE comment_id = $2
        RETURNING comment_id, body, author, article_id, created_at, votes"#,
    )
    .bind(inc_votes)
    .bind(comment_id)
    .fetch_optional(&mut tx)
    .await?;
    tx.commit().await?;

    comment.ok_or(RequestError::NotFound("Comment not found"))
}

pub async fn delete_comment_in_db(pool: &SqlitePool, comment_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM comments WHERE comment_id = $1")
        .bind(comment_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;

    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Comment not found"));
    }
    Ok(())
}
