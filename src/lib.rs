use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

pub mod config;
pub mod db;
pub mod dispatch_client;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod smtp;

use config::Config;

/// Shared state for the whole router.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
