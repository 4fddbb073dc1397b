mod authentication;
mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod models;
mod validation;

use std::{
    net::{SocketAddr, TcpListener},
    str::FromStr,
    sync::Arc,
};

use anyhow::Context;
pub use anyhow::Result;
use axum::{routing::*, Extension, Router};
pub use config::Config;
pub use data_formats::*;
use handlers::*;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool,
};
use tower_http::trace::TraceLayer;

/// Shared by every request through an `Extension` layer.
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
}

pub async fn run_app(app: Router, config: Config) -> Result<()> {
    let address = config.address();
    let pool = init_db(&config.database_url).await?;
    let state = Arc::new(AppState { pool, config });
    let app = app
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http());
    tracing::info!(%address, "server started");
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!(db_url, "creating database");
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    } else {
        tracing::debug!(db_url, "database already exists");
    }
    let options = SqliteConnectOptions::from_str(db_url)
        .context("Invalid DATABASE_URL")?
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    tracing::debug!("running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("migrations completed");
    let users = db_helpers::count_users(&pool).await?;
    let posts = db_helpers::count_posts(&pool).await?;
    tracing::info!(users, posts, "database ready");
    Ok(pool)
}

pub fn get_random_free_port() -> Result<(u16, SocketAddr)> {
    let listener = TcpListener::bind("127.0.0.1:0").context("Could not bind a free port")?;
    let addr = listener.local_addr().context("Could not get a free port")?;
    Ok((addr.port(), addr))
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/", get(get_all_posts))
        .route("/register", get(register_page).post(register_user))
        .route("/login", get(login_page).post(login_user))
        .route("/logout", get(logout))
        .route("/post/:id", get(show_post).post(add_comment))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/Create-post", get(create_post_page).post(create_post))
        .route("/edit-post/:id", get(edit_post_page).post(edit_post))
        .route("/delete/:id", get(delete_blog))
        .fallback(not_found)
}
