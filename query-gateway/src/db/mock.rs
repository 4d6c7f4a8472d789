//! Mock connection providers for tests.
//!
//! `MockProvider` returns canned results keyed by database name and
//! records how often it was asked to connect, so tests can assert that
//! validation failures short-circuit before any connection attempt.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::config::SourceCredentials;
use common::errors::{AppError, AppResult};
use common::models::ScanValue;

use super::{ConnectionProvider, DbConnection, ScannedRows};

/// A connection provider serving predefined result sets.
#[derive(Default)]
pub struct MockProvider {
    connects: AtomicUsize,
    closes: Arc<AtomicUsize>,
    results: HashMap<String, ScannedRows>,
    fail_queries: bool,
}

impl MockProvider {
    /// Creates a provider with no registered result sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the result set served for the given database name.
    pub fn with_result(
        mut self,
        database: impl Into<String>,
        columns: Vec<&str>,
        rows: Vec<Vec<ScanValue>>,
    ) -> Self {
        let columns = columns.into_iter().map(String::from).collect();
        self.results.insert(database.into(), (columns, rows));
        self
    }

    /// Makes every query on every handed-out connection fail.
    pub fn with_query_failure(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Number of connection attempts made against this provider.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of connections that have been released.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionProvider for MockProvider {
    async fn connect(&self, creds: &SourceCredentials) -> AppResult<Box<dyn DbConnection>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        creds.ensure_complete()?;

        let result = self
            .results
            .get(&creds.database)
            .cloned()
            .ok_or_else(|| {
                AppError::Connection(format!("unknown database {}", creds.database))
            })?;

        Ok(Box::new(MockConnection {
            result,
            fail_queries: self.fail_queries,
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct MockConnection {
    result: ScannedRows,
    fail_queries: bool,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl DbConnection for MockConnection {
    async fn fetch_all(&mut self, _query: &str) -> AppResult<ScannedRows> {
        if self.fail_queries {
            return Err(AppError::Execution("simulated query failure".into()));
        }
        Ok(self.result.clone())
    }

    async fn close(self: Box<Self>) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// A provider whose connections always fail to open.
pub struct FailingProvider;

#[async_trait]
impl ConnectionProvider for FailingProvider {
    async fn connect(&self, _creds: &SourceCredentials) -> AppResult<Box<dyn DbConnection>> {
        Err(AppError::Connection("connection refused".into()))
    }
}
