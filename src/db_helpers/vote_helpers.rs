use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;

use super::{is_foreign_key_violation, is_unique_violation};

// Dispatches the one toggle algorithm to the matching table/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Article(i64),
    Comment(i64),
}

impl VoteTarget {
    fn table(&self) -> &'static str {
        match self {
            Self::Article(_) => "users_article_votes",
            Self::Comment(_) => "users_comment_votes",
        }
    }

    fn id_column(&self) -> &'static str {
        match self {
            Self::Article(_) => "article_id",
            Self::Comment(_) => "comment_id",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Article(id) | Self::Comment(id) => *id,
        }
    }
}

// Returns the value now in effect: the desired value when applied or
// replaced, 0 when retracted. Lookup and mutation share one transaction and
// the UNIQUE (username, target) constraint backs that up under races.
pub async fn toggle_vote_in_db(
    pool: &SqlitePool,
    username: &str,
    target: VoteTarget,
    vote_value: i64,
) -> Result<i64, RequestError> {
    if vote_value != 1 && vote_value != -1 {
        return Err(RequestError::BadRequest("vote_value must be 1 or -1"));
    }

    let table = target.table();
    let id_column = target.id_column();
    let select = format!(
        "SELECT vote_value FROM {table} WHERE username = $1 AND {id_column} = $2"
    );
    let insert = format!(
        "INSERT INTO {table} (username, {id_column}, vote_value) VALUES ($1, $2, $3)"
    );
    let delete = format!("DELETE FROM {table} WHERE username = $1 AND {id_column} = $2");

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<Sqlite, (i64,)>(&select)
        .bind(username)
        .bind(target.id())
        .fetch_optional(&mut tx)
        .await?;

    let applied = match existing {
        None => {
            sqlx::query(&insert)
                .bind(username)
                .bind(target.id())
                .bind(vote_value)
                .execute(&mut tx)
                .await
                .map_err(classify_vote_insert_error)?;
            vote_value
        }
        // Resubmitting the same vote retracts it.
        Some((current,)) if current == vote_value => {
            sqlx::query(&delete)
                .bind(username)
                .bind(target.id())
                .execute(&mut tx)
                .await?;
            0
        }
        // Opposite value: replace, never accumulate.
        Some(_) => {
            sqlx::query(&delete)
                .bind(username)
                .bind(target.id())
                .execute(&mut tx)
                .await?;
            sqlx::query(&insert)
                .bind(username)
                .bind(target.id())
                .bind(vote_value)
                .execute(&mut tx)
                .await
                .map_err(classify_vote_insert_error)?;
            vote_value
        }
    };

    tx.commit().await?;
    Ok(applied)
}

fn classify_vote_insert_error(error: sqlx::Error) -> RequestError {
    if is_unique_violation(&error) {
        RequestError::Conflict("Vote already recorded")
    } else if is_foreign_key_violation(&error) {
        RequestError::NotFound("User or vote target not found")
    } else {
        RequestError::DatabaseError(error)
    }
}

// The user's current vote on the target, if any.
pub async fn fetch_user_vote_in_db(
    pool: &SqlitePool,
    username: &str,
    target: VoteTarget,
) -> Result<Option<i64>, RequestError> {
    let query = format!(
        "SELECT vote_value FROM {table} WHERE username = $1 AND {id_column} = $2",
        table = target.table(),
        id_column = target.id_column(),
    );
    let mut tx = pool.begin().await?;
    let vote = sqlx::query_as::<Sqlite, (i64,)>(&query)
        .bind(username)
        .bind(target.id())
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(vote.map(|(value,)| value))
}
