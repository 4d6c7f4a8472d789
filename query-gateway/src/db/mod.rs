//! Database access layer.
//!
//! Defines the provider/connection seam used by the query pipeline,
//! with a sqlx-backed MySQL implementation and a mock for tests. One
//! connection is dialed per request and released when the request
//! finishes; there is no pooling or reuse.

mod mock;
mod mysql;

pub use mock::{FailingProvider, MockProvider};
pub use mysql::MySqlProvider;

use async_trait::async_trait;
use common::config::SourceCredentials;
use common::errors::AppResult;
use common::models::ScanValue;

/// Raw materialized output of one query: ordered column names plus the
/// scanned rows.
pub type ScannedRows = (Vec<String>, Vec<Vec<ScanValue>>);

/// Produces live, validated database connections.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Opens a fresh connection for the given credentials and verifies
    /// it with a liveness check before handing it out. A connection
    /// that fails the check is closed, never leaked.
    async fn connect(&self, creds: &SourceCredentials) -> AppResult<Box<dyn DbConnection>>;
}

/// A dedicated connection owned by a single in-flight request.
#[async_trait]
pub trait DbConnection: Send {
    /// Executes the query exactly once and materializes every row into
    /// memory. Cursor and decode failures surface as execution errors.
    async fn fetch_all(&mut self, query: &str) -> AppResult<ScannedRows>;

    /// Releases the underlying connection.
    async fn close(self: Box<Self>);
}
