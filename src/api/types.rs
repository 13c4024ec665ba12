//! Shared types for the API layer.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::db;

/// Shared context for all API routes. Holds the database path; handlers
/// open one connection per request, so SQLite's write lock — not shared
/// in-process state — serializes concurrent workflow writes.
#[derive(Clone)]
pub struct ApiContext {
    db_path: Arc<PathBuf>,
}

impl ApiContext {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path: Arc::new(db_path),
        }
    }

    /// Open a connection to the (already migrated) database.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        db::open_existing(&self.db_path).map_err(ApiError::from)
    }
}
