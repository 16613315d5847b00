//! `RecordStore` over the local SQLite database.
//!
//! rusqlite is synchronous, so each read runs on the blocking pool with the
//! connection held behind a mutex for the duration of one query.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ReadQuery, RecordStore};
use crate::db::{DbCompetitor, DbCustomer, DbError, DbRecruit, PipelineDb};
use crate::error::StoreError;

#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<PipelineDb>>,
}

impl SqliteStore {
    pub fn new(db: PipelineDb) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open (and migrate) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        Ok(Self::new(PipelineDb::open_at(path.to_path_buf())?))
    }

    /// Open an existing database without write access.
    pub fn open_readonly(path: &Path) -> Result<Self, DbError> {
        Ok(Self::new(PipelineDb::open_readonly_at(path)?))
    }

    /// Shared handle to the underlying database, for callers that own writes.
    pub fn db(&self) -> Arc<Mutex<PipelineDb>> {
        Arc::clone(&self.db)
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&PipelineDb) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let guard = db.lock();
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
        .map_err(StoreError::from)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn customers(&self, query: &ReadQuery) -> Result<Vec<DbCustomer>, StoreError> {
        let query = query.clone();
        self.run(move |db| db.get_customers(&query)).await
    }

    async fn recruits(&self, query: &ReadQuery) -> Result<Vec<DbRecruit>, StoreError> {
        let query = query.clone();
        self.run(move |db| db.get_recruits(&query)).await
    }

    async fn competitors(&self, query: &ReadQuery) -> Result<Vec<DbCompetitor>, StoreError> {
        let query = query.clone();
        self.run(move |db| db.get_competitors(&query)).await
    }
}
