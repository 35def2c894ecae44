pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod notify;
pub mod render;
pub mod service;
pub mod state;
pub mod storage;
pub mod view;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use config::Config;
use error::Result;
use state::AppState;

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("CHANGEPOST_LOG"))
        .init();

    let config = Config::load()?;
    let db = storage::new_db_pool(&config.database_url).await?;
    storage::migrate(&db, storage::SCHEMA).await?;

    let state = AppState::new(db, config)?;
    api::run_server(state).await
}
