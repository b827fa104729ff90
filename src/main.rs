use std::net::SocketAddr;

use newsboard::{init_db, make_router, run_app};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let pool = match init_db().await {
        Ok(pool) => pool,
        Err(error) => {
            tracing::error!(%error, "failed to initialise database");
            return;
        }
    };
    let addr = SocketAddr::from(([127, 0, 0, 1], 3001));
    let router = make_router();
    tracing::info!(%addr, "server started");
    if let Err(error) = run_app(router, addr, pool).await {
        tracing::error!(%error, "server error");
    }
}
