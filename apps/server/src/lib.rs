//! Placehub - directory and discovery service for bookable venues
//!
//! The core of this service is the search engine under `db::search`:
//! conjunctive predicate building, seek (keyset) pagination with opaque
//! cursors, a closed set of sort strategies, geospatial radius search,
//! and batch result enrichment. Everything else is conventional CRUD
//! plumbing around it.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
