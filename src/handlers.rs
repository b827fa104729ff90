use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::data_formats::{
    ArticleDetailParams, ArticleQueryParams, ArticleResponse, ArticleWrapper, CommentQueryParams,
    CommentResponse, CreateArticleRequest, CreateCommentRequest, CreateTopicRequest,
    CreateUserRequest, MultipleArticlesWrapper, MultipleCommentsWrapper, MultipleTopicsWrapper,
    MultipleUsersWrapper, PostedArticleWrapper, PostedCommentWrapper, PostedTopicWrapper,
    PostedUserWrapper, UpdateArticleRequest, UpdateCommentRequest, UpdatedArticleWrapper,
    UpdatedCommentWrapper, UpdatedUserWrapper, UserWrapper, VoteRequest, VoteResponse,
};
use crate::db_helpers::{
    delete_article_in_db, delete_comment_in_db, delete_topic_in_db, delete_user_in_db,
    fetch_user_vote_in_db, get_article_by_id_in_db, get_random_article_in_db,
    get_user_by_username_in_db, insert_article_in_db, insert_comment_in_db, insert_topic_in_db,
    insert_user_in_db, list_article_comments_in_db, list_articles_in_db, list_topics_in_db,
    list_users_in_db, toggle_vote_in_db, update_article_by_id_in_db, update_comment_by_id_in_db,
    VoteTarget,
};
use crate::errors::RequestError;

type Db = Extension<Arc<SqlitePool>>;

enum ArticleSelector {
    Id(i64),
    Random,
}

fn parse_article_selector(raw: &str) -> Result<ArticleSelector, RequestError> {
    if raw == "random" {
        return Ok(ArticleSelector::Random);
    }
    parse_article_id(raw).map(ArticleSelector::Id)
}

fn parse_article_id(raw: &str) -> Result<i64, RequestError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(RequestError::BadRequest("Invalid article ID"))
}

fn parse_comment_id(raw: &str) -> Result<i64, RequestError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(RequestError::BadRequest("Invalid comment ID"))
}

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "msg": format!("URL {} provided was not found", uri)
        })),
    )
}

// ----------------- Topic Handlers -----------------
pub async fn get_topics(Extension(pool): Db) -> Result<Json<MultipleTopicsWrapper>, RequestError> {
    let topics = list_topics_in_db(&pool).await?;
    Ok(Json(MultipleTopicsWrapper { topics }))
}

pub async fn post_topic(
    Extension(pool): Db,
    Json(request): Json<CreateTopicRequest>,
) -> Result<(StatusCode, Json<PostedTopicWrapper>), RequestError> {
    let posted_topic = insert_topic_in_db(&pool, request).await?;
    Ok((StatusCode::CREATED, Json(PostedTopicWrapper { posted_topic })))
}

pub async fn delete_topic_by_slug(
    Extension(pool): Db,
    Path(slug): Path<String>,
) -> Result<StatusCode, RequestError> {
    delete_topic_in_db(&pool, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------- Article Handlers -----------------
pub async fn get_articles(
    Extension(pool): Db,
    Query(params): Query<ArticleQueryParams>,
) -> Result<Json<MultipleArticlesWrapper>, RequestError> {
    let query = params.validate()?;
    let articles = list_articles_in_db(&pool, query).await?;
    Ok(Json(MultipleArticlesWrapper {
        articles: articles.into_iter().map(ArticleResponse::new).collect(),
    }))
}

pub async fn post_article(
    Extension(pool): Db,
    Json(request): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<PostedArticleWrapper>), RequestError> {
    let article = insert_article_in_db(&pool, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(PostedArticleWrapper {
            posted_article: ArticleResponse::new(article),
        }),
    ))
}

pub async fn get_article_by_id(
    Extension(pool): Db,
    Path(article_id): Path<String>,
    Query(params): Query<ArticleDetailParams>,
) -> Result<Json<ArticleWrapper>, RequestError> {
    let article = match parse_article_selector(&article_id)? {
        ArticleSelector::Random => get_random_article_in_db(&pool, params.topic).await?,
        ArticleSelector::Id(id) => get_article_by_id_in_db(&pool, id).await?,
    };

    let article = match params.current_user {
        Some(username) => {
            let vote =
                fetch_user_vote_in_db(&pool, &username, VoteTarget::Article(article.article_id))
                    .await?;
            ArticleResponse::new(article).with_vote(vote)
        }
        None => ArticleResponse::new(article),
    };
    Ok(Json(ArticleWrapper { article }))
}

pub async fn patch_article_by_id(
    Extension(pool): Db,
    Path(article_id): Path<String>,
    Json(request): Json<UpdateArticleRequest>,
) -> Result<Json<UpdatedArticleWrapper>, RequestError> {
    let article_id = parse_article_id(&article_id)?;
    let article = update_article_by_id_in_db(&pool, article_id, request).await?;
    Ok(Json(UpdatedArticleWrapper {
        updated_article: ArticleResponse::new(article),
    }))
}

pub async fn delete_article_by_id(
    Extension(pool): Db,
    Path(article_id): Path<String>,
) -> Result<StatusCode, RequestError> {
    let article_id = parse_article_id(&article_id)?;
    delete_article_in_db(&pool, article_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------- Comment Handlers -----------------
pub async fn get_article_comments(
    Extension(pool): Db,
    Path(article_id): Path<String>,
    Query(params): Query<CommentQueryParams>,
) -> Result<Json<MultipleCommentsWrapper>, RequestError> {
    let article_id = parse_article_id(&article_id)?;
    let (order, page) = params.validate()?;
    let comments = list_article_comments_in_db(&pool, article_id, order, page).await?;
    Ok(Json(MultipleCommentsWrapper {
        comments: comments.into_iter().map(CommentResponse::new).collect(),
    }))
}

pub async fn post_article_comment(
    Extension(pool): Db,
    Path(article_id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<PostedCommentWrapper>), RequestError> {
    let article_id = parse_article_id(&article_id)?;
    let comment = insert_comment_in_db(&pool, article_id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(PostedCommentWrapper {
            posted_comment: CommentResponse::new(comment),
        }),
    ))
}

pub async fn patch_comment_by_id(
    Extension(pool): Db,
    Path(comment_id): Path<String>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<UpdatedCommentWrapper>, RequestError> {
    let comment_id = parse_comment_id(&comment_id)?;
    let comment = update_comment_by_id_in_db(&pool, comment_id, request.inc_votes).await?;
    Ok(Json(UpdatedCommentWrapper {
        updated_comment: CommentResponse::new(comment),
    }))
}

pub async fn delete_comment_by_id(
    Extension(pool): Db,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, RequestError> {
    let comment_id = parse_comment_id(&comment_id)?;
    delete_comment_in_db(&pool, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------- User Handlers -----------------
pub async fn get_users(Extension(pool): Db) -> Result<Json<MultipleUsersWrapper>, RequestError> {
    let users = list_users_in_db(&pool).await?;
    Ok(Json(MultipleUsersWrapper { users }))
}

pub async fn post_user(
    Extension(pool): Db,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PostedUserWrapper>), RequestError> {
    let posted_user = insert_user_in_db(&pool, request).await?;
    Ok((StatusCode::CREATED, Json(PostedUserWrapper { posted_user })))
}

pub async fn get_user_by_username(
    Extension(pool): Db,
    Path(username): Path<String>,
) -> Result<Json<UserWrapper>, RequestError> {
    let user = get_user_by_username_in_db(&pool, &username).await?;
    Ok(Json(UserWrapper { user }))
}

pub async fn delete_user_by_username(
    Extension(pool): Db,
    Path(username): Path<String>,
) -> Result<StatusCode, RequestError> {
    delete_user_in_db(&pool, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Vote toggling rides on PATCH /api/users/:username. The body names exactly
// one target; anything else is rejected before the store is touched.
pub async fn patch_user_by_username(
    Extension(pool): Db,
    Path(username): Path<String>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<UpdatedUserWrapper>, RequestError> {
    let target = match (request.article_id, request.comment_id) {
        (Some(id), None) => VoteTarget::Article(id),
        (None, Some(id)) => VoteTarget::Comment(id),
        _ => {
            return Err(RequestError::BadRequest(
                "Provide exactly one of article_id or comment_id",
            ))
        }
    };
    let applied = toggle_vote_in_db(&pool, &username, target, request.vote_value).await?;
    Ok(Json(UpdatedUserWrapper {
        updated_user: VoteResponse::new(username, target, applied),
    }))
}
