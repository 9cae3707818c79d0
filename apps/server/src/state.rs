//! Shared application state

use crate::config::Config;
use crate::db::SearchEngine;
use crate::services::{PlaceService, SearchService};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: PgPool,
    pub search_service: Arc<SearchService>,
    pub place_service: Arc<PlaceService>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
            .connect(&config.database.url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        if config.database.run_migrations {
            sqlx::migrate!("./migrations")
                .run(&db_pool)
                .await
                .context("Failed to run database migrations")?;
        }

        let search_engine = Arc::new(SearchEngine::new(db_pool.clone(), config.search.clone()));
        let search_service = Arc::new(SearchService::new(search_engine));
        let place_service = Arc::new(PlaceService::new(db_pool.clone()));

        Ok(Self {
            config: Arc::new(config),
            db_pool,
            search_service,
            place_service,
        })
    }
}
