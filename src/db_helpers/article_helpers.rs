use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::data_formats::{
    ArticleListQuery, CreateArticleRequest, Pagination, SortOrder, UpdateArticleRequest,
};
use crate::errors::RequestError;
use crate::models::{Article, Comment};

use super::{is_foreign_key_violation, QueryBuilder};

pub const DEFAULT_ARTICLE_IMG_URL: &str =
    "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700";

// Column list shared by every article query. `body` is NULLed out in the list
// query and `total_count` in the detail queries so both map onto one row type.
const LIST_COLUMNS: &str = r#"
            articles.article_id                   AS "article_id",
            articles.author                       AS "author",
            articles.title                        AS "title",
            articles.topic                        AS "topic",
            NULL                                  AS "body",
            articles.created_at                   AS "created_at",
            articles.votes                        AS "votes",
            articles.article_img_url              AS "article_img_url",
            COUNT(comments.comment_id)            AS "comment_count",
            COUNT(articles.article_id) OVER ()    AS "total_count""#;

const DETAIL_COLUMNS: &str = r#"
            articles.article_id                   AS "article_id",
            articles.author                       AS "author",
            articles.title                        AS "title",
            articles.topic                        AS "topic",
            articles.body                         AS "body",
            articles.created_at                   AS "created_at",
            articles.votes                        AS "votes",
            articles.article_img_url              AS "article_img_url",
            COUNT(comments.comment_id)            AS "comment_count",
            NULL                                  AS "total_count""#;

// One aggregate statement: comment_count is the grouped LEFT JOIN count and
// total_count the windowed pre-pagination count.
pub async fn list_articles_in_db(
    pool: &SqlitePool,
    ArticleListQuery {
        topic,
        author,
        sort_by,
        order,
        page,
    }: ArticleListQuery,
) -> Result<Vec<Article>, RequestError> {
    let builder = QueryBuilder::new("WHERE ", " AND ")
        .add_param("articles.topic =", topic)
        .add_param("articles.author =", author);
    let limit_placeholder = builder.next_placeholder();
    let (where_clause, params) = builder.build();

    let query = format!(
        r#"SELECT {LIST_COLUMNS}
        FROM articles
        LEFT JOIN comments ON comments.article_id = articles.article_id
        {where_clause}
        GROUP BY articles.article_id
        ORDER BY {sort} {order}
        LIMIT ${limit_placeholder} OFFSET ${offset_placeholder}"#,
        sort = sort_by.as_sql(),
        order = order.as_sql(),
        offset_placeholder = limit_placeholder + 1,
    );

    let mut tx = pool.begin().await?;
    let mut articles = sqlx::query_as::<Sqlite, Article>(&query);
    for param in params {
        articles = articles.bind(param);
    }
    let articles = articles
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;

    if articles.is_empty() {
        return Err(RequestError::NotFound("Not found"));
    }
    Ok(articles)
}

// Detail fetch shared by the helpers below, run on their transaction so a
// write followed by a re-fetch sees its own effects.
async fn fetch_article_detail(
    tx: &mut Transaction<'_, Sqlite>,
    article_id: i64,
) -> Result<Option<Article>, RequestError> {
    let query = format!(
        r#"SELECT {DETAIL_COLUMNS}
        FROM articles
        LEFT JOIN comments ON comments.article_id = articles.article_id
        WHERE articles.article_id = $1
        GROUP BY articles.article_id"#
    );
    let article = sqlx::query_as::<Sqlite, Article>(&query)
        .bind(article_id)
        .fetch_optional(&mut *tx)
        .await?;
    Ok(article)
}

pub async fn get_article_by_id_in_db(
    pool: &SqlitePool,
    article_id: i64,
) -> Result<Article, RequestError> {
    let mut tx = pool.begin().await?;
    let article = fetch_article_detail(&mut tx, article_id).await?;
    tx.commit().await?;

    article.ok_or(RequestError::NotFound("Article not found"))
}

// Picks one article uniformly at random from the optionally topic-filtered set.
pub async fn get_random_article_in_db(
    pool: &SqlitePool,
    topic: Option<String>,
) -> Result<Article, RequestError> {
    let (where_clause, params) =
        QueryBuilder::new("WHERE ", " AND ")
            .add_param("articles.topic =", topic)
            .build();
    let query = format!(
        r#"SELECT {DETAIL_COLUMNS}
        FROM articles
        LEFT JOIN comments ON comments.article_id = articles.article_id
        {where_clause}
        GROUP BY articles.article_id
        ORDER BY RANDOM()
        LIMIT 1"#
    );

    let mut tx = pool.begin().await?;
    let mut article = sqlx::query_as::<Sqlite, Article>(&query);
    for param in params {
        article = article.bind(param);
    }
    let article = article.fetch_optional(&mut tx).await?;
    tx.commit().await?;

    article.ok_or(RequestError::NotFound("Not found"))
}

// The parent article is checked first so a missing article is a 404 rather
// than an empty list.
pub async fn list_article_comments_in_db(
    pool: &SqlitePool,
    article_id: i64,
    order: SortOrder,
    page: Pagination,
) -> Result<Vec<Comment>, RequestError> {
    let mut tx = pool.begin().await?;
    let article = sqlx::query_as::<Sqlite, (i64,)>(
        "SELECT article_id FROM articles WHERE article_id = $1",
    )
    .bind(article_id)
    .fetch_optional(&mut tx)
    .await?;
    if article.is_none() {
        return Err(RequestError::NotFound("Article not found"));
    }

    let query = format!(
        r#"SELECT comment_id, body, author, article_id, created_at, votes
        FROM comments
        WHERE article_id = $1
        ORDER BY created_at {order}
        LIMIT $2 OFFSET $3"#,
        order = order.as_sql(),
    );
    let comments = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(article_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;

    Ok(comments)
}

pub async fn insert_article_in_db(
    pool: &SqlitePool,
    CreateArticleRequest {
        title,
        topic,
        author,
        body,
        article_img_url,
    }: CreateArticleRequest,
) -> Result<Article, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, (i64,)>(
        r#"INSERT INTO articles (title, topic, author, body, article_img_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING article_id"#,
    )
    .bind(title)
    .bind(topic)
    .bind(author)
    .bind(body)
    .bind(article_img_url.unwrap_or_else(|| DEFAULT_ARTICLE_IMG_URL.to_string()))
    .fetch_one(&mut tx)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            RequestError::NotFound("Author or topic not found")
        } else {
            RequestError::DatabaseError(e)
        }
    })?;

    // Re-fetch on the same transaction so the returned entity carries its
    // derived fields (comment_count is 0 for a fresh article).
    let article = fetch_article_detail(&mut tx, result.0).await?;
    tx.commit().await?;

    article.ok_or(RequestError::NotFound("Article not found"))
}

pub async fn update_article_by_id_in_db(
    pool: &SqlitePool,
    article_id: i64,
    UpdateArticleRequest {
        inc_votes,
        article_img_url,
    }: UpdateArticleRequest,
) -> Result<Article, RequestError> {
    let builder = QueryBuilder::new("SET ", ", ")
        .add_param("votes = votes +", inc_votes.map(|delta| delta.to_string()))
        .add_param("article_img_url =", article_img_url);
    if builder.is_empty() {
        return Err(RequestError::BadRequest("No update fields provided"));
    }
    let id_placeholder = builder.next_placeholder();
    let (set_clause, params) = builder.build();

    let query = format!("UPDATE articles {set_clause} WHERE articles.article_id = ${id_placeholder}");
    let mut tx = pool.begin().await?;
    let mut result = sqlx::query(&query);
    for param in params {
        result = result.bind(param);
    }
    let result = result.bind(article_id).execute(&mut tx).await?;

    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Article not found"));
    }

    // comment_count is re-derived on the way back out.
    let article = fetch_article_detail(&mut tx, article_id).await?;
    tx.commit().await?;

    article.ok_or(RequestError::NotFound("Article not found"))
}

pub async fn delete_article_in_db(pool: &SqlitePool, article_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM articles WHERE article_id = $1")
        .bind(article_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;

    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Article not found"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_formats::{ArticleQueryParams, SortColumn};
    use crate::db_helpers::test_support::{seed, seeded_pool, shared_file_pool};

    fn list_query(params: ArticleQueryParams) -> ArticleListQuery {
        params.validate().unwrap()
    }

    #[tokio::test]
    async fn lists_ten_newest_articles_by_default_with_total_count() {
        let pool = seeded_pool().await;
        let articles = list_articles_in_db(&pool, list_query(ArticleQueryParams::default()))
            .await
            .unwrap();

        assert_eq!(articles.len(), 10);
        assert_eq!(articles[0].article_id, 1);
        for pair in articles.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        for article in &articles {
            assert_eq!(article.total_count, Some(12));
            assert!(article.body.is_none());
        }
    }

    #[tokio::test]
    async fn comment_count_is_exact_including_zero() {
        let pool = seeded_pool().await;
        let articles = list_articles_in_db(
            &pool,
            list_query(ArticleQueryParams {
                limit: Some("50".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(articles.len(), 12);
        let by_id = |id: i64| articles.iter().find(|a| a.article_id == id).unwrap();
        assert_eq!(by_id(1).comment_count, 2);
        assert_eq!(by_id(5).comment_count, 2);
        assert_eq!(by_id(2).comment_count, 0);
    }

    #[tokio::test]
    async fn topic_filter_returns_only_that_topic() {
        let pool = seeded_pool().await;
        let articles = list_articles_in_db(
            &pool,
            list_query(ArticleQueryParams {
                topic: Some("cats".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].article_id, 5);
        assert_eq!(articles[0].topic, "cats");
        assert_eq!(articles[0].comment_count, 2);
        assert_eq!(articles[0].total_count, Some(1));
    }

    #[tokio::test]
    async fn topic_and_author_filters_are_conjunctive() {
        let pool = seeded_pool().await;
        let articles = list_articles_in_db(
            &pool,
            list_query(ArticleQueryParams {
                author: Some("icellusedkars".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(articles.len(), 6);

        let both = list_articles_in_db(
            &pool,
            list_query(ArticleQueryParams {
                topic: Some("coding".into()),
                author: Some("butter_bridge".into()),
                limit: Some("50".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(both.len(), 5);
        for article in &both {
            assert_eq!(article.topic, "coding");
            assert_eq!(article.author, "butter_bridge");
        }
    }

    #[tokio::test]
    async fn filter_matching_nothing_is_not_found() {
        let pool = seeded_pool().await;
        let result = list_articles_in_db(
            &pool,
            list_query(ArticleQueryParams {
                topic: Some("banana".into()),
                ..Default::default()
            }),
        )
        .await;
        assert!(matches!(result, Err(RequestError::NotFound(_))));
    }

    #[tokio::test]
    async fn pagination_windows_the_result() {
        let pool = seeded_pool().await;
        let page_three = list_articles_in_db(
            &pool,
            list_query(ArticleQueryParams {
                limit: Some("5".into()),
                p: Some("3".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(page_three.len(), 2);
        assert_eq!(page_three[0].article_id, 11);
        assert_eq!(page_three[1].article_id, 12);
    }

    #[tokio::test]
    async fn limit_beyond_total_returns_all_rows() {
        let pool = seeded_pool().await;
        let articles = list_articles_in_db(
            &pool,
            list_query(ArticleQueryParams {
                limit: Some("100".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(articles.len(), 12);
    }

    #[tokio::test]
    async fn sorts_by_whitelisted_column_in_requested_direction() {
        let pool = seeded_pool().await;
        let query = list_query(ArticleQueryParams {
            sort_by: Some("votes".into()),
            order: Some("asc".into()),
            limit: Some("50".into()),
            ..Default::default()
        });
        assert_eq!(query.sort_by, SortColumn::Votes);
        let articles = list_articles_in_db(&pool, query).await.unwrap();
        assert_eq!(articles.last().unwrap().article_id, 1);
        assert_eq!(articles.last().unwrap().votes, 100);
    }

    #[tokio::test]
    async fn sorts_by_derived_comment_count() {
        let pool = seeded_pool().await;
        let articles = list_articles_in_db(
            &pool,
            list_query(ArticleQueryParams {
                sort_by: Some("comment_count".into()),
                order: Some("desc".into()),
                limit: Some("2".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(articles[0].comment_count, 2);
        assert_eq!(articles[1].comment_count, 2);
    }

    #[tokio::test]
    async fn detail_fetch_includes_body_and_comment_count() {
        let pool = seeded_pool().await;
        let article = get_article_by_id_in_db(&pool, 5).await.unwrap();
        assert_eq!(article.author, "rogersop");
        assert_eq!(article.body.as_deref(), Some("Bastet walks amongst us"));
        assert_eq!(article.comment_count, 2);
        assert_eq!(article.total_count, None);
    }

    #[tokio::test]
    async fn detail_fetch_of_missing_article_is_not_found() {
        let pool = seeded_pool().await;
        let result = get_article_by_id_in_db(&pool, 9000).await;
        assert!(matches!(
            result,
            Err(RequestError::NotFound("Article not found"))
        ));
    }

    #[tokio::test]
    async fn random_fetch_honours_the_topic_filter() {
        let pool = seeded_pool().await;
        let article = get_random_article_in_db(&pool, Some("cats".into()))
            .await
            .unwrap();
        assert_eq!(article.article_id, 5);
        assert_eq!(article.comment_count, 2);

        let result = get_random_article_in_db(&pool, Some("banana".into())).await;
        assert!(matches!(result, Err(RequestError::NotFound(_))));
    }

    #[tokio::test]
    async fn article_comments_sort_and_paginate() {
        let pool = seeded_pool().await;
        let newest_first = list_article_comments_in_db(
            &pool,
            1,
            SortOrder::Descending,
            Pagination::from_params(None, None).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(newest_first.len(), 2);
        assert_eq!(newest_first[0].comment_id, 2);

        let oldest_first = list_article_comments_in_db(
            &pool,
            1,
            SortOrder::Ascending,
            Pagination::from_params(Some("1".into()), Some("2".into())).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(oldest_first.len(), 1);
        assert_eq!(oldest_first[0].comment_id, 2);
    }

    #[tokio::test]
    async fn comments_for_missing_article_are_not_found() {
        let pool = seeded_pool().await;
        let result = list_article_comments_in_db(
            &pool,
            9000,
            SortOrder::Descending,
            Pagination::from_params(None, None).unwrap(),
        )
        .await;
        assert!(matches!(
            result,
            Err(RequestError::NotFound("Article not found"))
        ));
    }

    #[tokio::test]
    async fn insert_applies_the_default_image_url() {
        let pool = seeded_pool().await;
        let article = insert_article_in_db(
            &pool,
            CreateArticleRequest {
                title: "Fresh".into(),
                topic: "cats".into(),
                author: "rogersop".into(),
                body: "New cat news".into(),
                article_img_url: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(article.article_img_url, DEFAULT_ARTICLE_IMG_URL);
        assert_eq!(article.comment_count, 0);
        assert_eq!(article.votes, 0);
    }

    #[tokio::test]
    async fn insert_preserves_a_provided_image_url() {
        let pool = seeded_pool().await;
        let article = insert_article_in_db(
            &pool,
            CreateArticleRequest {
                title: "Fresh".into(),
                topic: "cats".into(),
                author: "rogersop".into(),
                body: "New cat news".into(),
                article_img_url: Some("https://www.example.com/cat.png".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(article.article_img_url, "https://www.example.com/cat.png");
    }

    #[tokio::test]
    async fn insert_and_refetch_cross_pool_connections_cleanly() {
        // More than one connection, so the re-fetch inside the insert and
        // the follow-up read land on different connections than the write.
        let pool = shared_file_pool("insert-refetch").await;
        seed(&pool).await;

        for n in 0..5 {
            let article = insert_article_in_db(
                &pool,
                CreateArticleRequest {
                    title: format!("Fresh {n}"),
                    topic: "cats".into(),
                    author: "rogersop".into(),
                    body: "New cat news".into(),
                    article_img_url: None,
                },
            )
            .await
            .unwrap();
            assert_eq!(article.comment_count, 0);

            let refetched = get_article_by_id_in_db(&pool, article.article_id)
                .await
                .unwrap();
            assert_eq!(refetched.title, format!("Fresh {n}"));
        }
    }

    #[tokio::test]
    async fn insert_with_unknown_topic_or_author_is_not_found() {
        let pool = seeded_pool().await;
        let result = insert_article_in_db(
            &pool,
            CreateArticleRequest {
                title: "Fresh".into(),
                topic: "banana".into(),
                author: "rogersop".into(),
                body: "".into(),
                article_img_url: None,
            },
        )
        .await;
        assert!(matches!(result, Err(RequestError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_applies_a_signed_votes_delta() {
        let pool = seeded_pool().await;
        let article = update_article_by_id_in_db(
            &pool,
            1,
            UpdateArticleRequest {
                inc_votes: Some(3),
                article_img_url: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(article.votes, 103);
        assert_eq!(article.comment_count, 2);

        let article = update_article_by_id_in_db(
            &pool,
            1,
            UpdateArticleRequest {
                inc_votes: Some(-5),
                article_img_url: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(article.votes, 98);
    }

    #[tokio::test]
    async fn update_can_change_the_image_url_alongside_votes() {
        let pool = seeded_pool().await;
        let article = update_article_by_id_in_db(
            &pool,
            2,
            UpdateArticleRequest {
                inc_votes: Some(2),
                article_img_url: Some("https://www.example.com/laptop.png".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(article.votes, 2);
        assert_eq!(article.article_img_url, "https://www.example.com/laptop.png");
    }

    #[tokio::test]
    async fn update_without_fields_is_a_bad_request() {
        let pool = seeded_pool().await;
        let result = update_article_by_id_in_db(&pool, 1, UpdateArticleRequest::default()).await;
        assert!(matches!(result, Err(RequestError::BadRequest(_))));
    }

    #[tokio::test]
    async fn update_of_missing_article_is_not_found() {
        let pool = seeded_pool().await;
        let result = update_article_by_id_in_db(
            &pool,
            9000,
            UpdateArticleRequest {
                inc_votes: Some(1),
                article_img_url: None,
            },
        )
        .await;
        assert!(matches!(result, Err(RequestError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_the_article_and_its_comments() {
        let pool = seeded_pool().await;
        delete_article_in_db(&pool, 1).await.unwrap();
        assert!(get_article_by_id_in_db(&pool, 1).await.is_err());

        let (orphans,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM comments WHERE article_id = 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(orphans, 0);

        let result = delete_article_in_db(&pool, 1).await;
        assert!(matches!(result, Err(RequestError::NotFound(_))));
    }
}
