mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod models;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use data_formats::*;
use handlers::*;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    str::FromStr,
    sync::Arc,
};

pub type JsonResponse<T> = (StatusCode, Json<T>);

pub async fn run_app(app: Router, address: SocketAddr, pool: SqlitePool) -> Result<()> {
    let app = app.layer(Extension(Arc::new(pool)));
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

// Serves on an already-bound listener, so the port picked by
// `bind_random_port` cannot be snatched between binding and serving.
pub async fn run_app_from_tcp(app: Router, listener: TcpListener, pool: SqlitePool) -> Result<()> {
    let app = app.layer(Extension(Arc::new(pool)));
    listener.set_nonblocking(true)?;
    axum::Server::from_tcp(listener)?
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db() -> Result<SqlitePool> {
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    connect_db(&db_url).await
}

pub async fn connect_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!(db_url, "creating database");
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    }
    // Foreign keys are enforced on every connection; unknown author/topic
    // references must fail at the store.
    let options = SqliteConnectOptions::from_str(db_url)?.foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    tracing::info!("running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    Ok(pool)
}

pub fn bind_random_port() -> Result<(SocketAddr, TcpListener)> {
    let listener = TcpListener::bind("localhost:0").context("Could not bind a free port")?;
    let address = listener
        .local_addr()
        .context("Could not read the bound address")?;
    Ok((address, listener))
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/api/topics", get(get_topics).post(post_topic))
        .route("/api/topics/:slug", delete(delete_topic_by_slug))
        .route("/api/articles", get(get_articles).post(post_article))
        .route(
            "/api/articles/:article_id",
            get(get_article_by_id)
                .patch(patch_article_by_id)
                .delete(delete_article_by_id),
        )
        .route(
            "/api/articles/:article_id/comments",
            get(get_article_comments).post(post_article_comment),
        )
        .route(
            "/api/comments/:comment_id",
            patch(patch_comment_by_id).delete(delete_comment_by_id),
        )
        .route("/api/users", get(get_users).post(post_user))
        .route(
            "/api/users/:username",
            get(get_user_by_username)
                .patch(patch_user_by_username)
                .delete(delete_user_by_username),
        )
        .fallback(not_found)
}
