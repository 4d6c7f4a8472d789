//! Query execution pipeline.

use std::sync::Arc;
use std::time::Instant;

use common::config::SourceRegistry;
use common::errors::{AppError, AppResult};
use common::models::{QueryRequest, QueryResult, ScanValue};
use validator::Validate;

use crate::db::ConnectionProvider;

/// Runs one query per call against a freshly dialed connection.
pub struct QueryService {
    registry: Arc<SourceRegistry>,
    provider: Arc<dyn ConnectionProvider>,
}

impl QueryService {
    /// Creates a new query service instance.
    pub fn new(registry: Arc<SourceRegistry>, provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { registry, provider }
    }

    /// Executes the full pipeline: validate, resolve the source,
    /// connect, run the query, encode the result.
    ///
    /// Validation and source resolution happen before any connection
    /// attempt. The connection is released on every path, including
    /// query failure.
    pub async fn execute(&self, req: &QueryRequest) -> AppResult<QueryResult> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let creds = self.registry.resolve(req.source)?;
        let mut conn = self.provider.connect(&creds).await?;

        let started = Instant::now();
        let outcome = conn.fetch_all(&req.query).await;
        conn.close().await;

        let (columns, rows) = outcome?;
        let result = encode_result(columns, rows);

        tracing::info!(
            source = req.source,
            rows = result.rows.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "query completed"
        );

        Ok(result)
    }
}

/// Builds the transport result set from scanned rows.
///
/// Every row object carries exactly the keys in `columns`, in cursor
/// order: missing trailing cells become null, surplus cells are
/// dropped.
pub fn encode_result(columns: Vec<String>, rows: Vec<Vec<ScanValue>>) -> QueryResult {
    let rows = rows
        .into_iter()
        .map(|values| {
            let mut cells = values.into_iter();
            let mut object = serde_json::Map::new();
            for column in &columns {
                let value = cells.next().unwrap_or(ScanValue::Null);
                object.insert(column.clone(), value.into_json());
            }
            object
        })
        .collect();

    QueryResult { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockProvider;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry() -> SourceRegistry {
        SourceRegistry::new("db.internal", "50000", "svc", "secret")
            .with_source(0, "MAIN")
            .with_source(1, "REPORTING")
    }

    fn request(query: &str, source: u32) -> QueryRequest {
        QueryRequest {
            query: query.to_string(),
            source,
        }
    }

    #[tokio::test]
    async fn empty_query_never_reaches_the_provider() {
        let provider = Arc::new(MockProvider::new());
        let service = QueryService::new(Arc::new(registry()), provider.clone());

        let err = service.execute(&request("", 0)).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(provider.connect_count(), 0);
    }

    #[tokio::test]
    async fn unknown_source_never_reaches_the_provider() {
        let provider = Arc::new(MockProvider::new());
        let service = QueryService::new(Arc::new(registry()), provider.clone());

        let err = service.execute(&request("SELECT 1", 999)).await.unwrap_err();

        assert!(matches!(err, AppError::SourceNotFound(999)));
        assert_eq!(provider.connect_count(), 0);
    }

    #[tokio::test]
    async fn scalar_values_round_trip_through_encoding() {
        let provider = Arc::new(MockProvider::new().with_result(
            "MAIN",
            vec!["id", "name", "ratio", "active"],
            vec![vec![
                ScanValue::Int(42),
                ScanValue::Text("widget".into()),
                ScanValue::Float(0.5),
                ScanValue::Bool(true),
            ]],
        ));
        let service = QueryService::new(Arc::new(registry()), provider);

        let result = service.execute(&request("SELECT 1", 0)).await.unwrap();

        assert_eq!(result.columns, vec!["id", "name", "ratio", "active"]);
        let row = &result.rows[0];
        assert_eq!(row["id"], json!(42));
        assert_eq!(row["name"], json!("widget"));
        assert_eq!(row["ratio"], json!(0.5));
        assert_eq!(row["active"], json!(true));
    }

    #[tokio::test]
    async fn binary_cells_encode_as_literal_text() {
        let provider = Arc::new(MockProvider::new().with_result(
            "MAIN",
            vec!["payload"],
            vec![vec![ScanValue::Bytes(vec![0x41, 0x42])]],
        ));
        let service = QueryService::new(Arc::new(registry()), provider);

        let result = service.execute(&request("SELECT payload", 0)).await.unwrap();

        assert_eq!(result.rows[0]["payload"], json!("AB"));
    }

    #[tokio::test]
    async fn zero_row_result_keeps_its_column_names() {
        let provider = Arc::new(MockProvider::new().with_result(
            "MAIN",
            vec!["id", "name"],
            vec![],
        ));
        let service = QueryService::new(Arc::new(registry()), provider);

        let result = service
            .execute(&request("SELECT id, name FROM t WHERE 1 = 0", 0))
            .await
            .unwrap();

        assert_eq!(result.columns, vec!["id", "name"]);
        assert!(result.rows.is_empty());
    }

    #[tokio::test]
    async fn row_key_sets_are_identical_even_for_sparse_rows() {
        let provider = Arc::new(MockProvider::new().with_result(
            "MAIN",
            vec!["a", "b"],
            vec![
                vec![ScanValue::Int(1), ScanValue::Int(2)],
                vec![ScanValue::Int(3)],
                vec![],
            ],
        ));
        let service = QueryService::new(Arc::new(registry()), provider);

        let result = service.execute(&request("SELECT a, b", 0)).await.unwrap();

        for row in &result.rows {
            assert_eq!(row.len(), result.columns.len());
            for column in &result.columns {
                assert!(row.contains_key(column));
            }
        }
        assert_eq!(result.rows[1]["b"], serde_json::Value::Null);
        assert_eq!(result.rows[2]["a"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn connection_is_released_after_query_failure() {
        let provider = Arc::new(
            MockProvider::new()
                .with_result("MAIN", vec!["x"], vec![])
                .with_query_failure(),
        );
        let service = QueryService::new(Arc::new(registry()), provider.clone());

        let err = service.execute(&request("SELECT x", 0)).await.unwrap_err();

        assert!(matches!(err, AppError::Execution(_)));
        assert_eq!(provider.connect_count(), 1);
        assert_eq!(provider.close_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_for_different_sources_do_not_interfere() {
        let provider = Arc::new(
            MockProvider::new()
                .with_result(
                    "MAIN",
                    vec!["id"],
                    vec![vec![ScanValue::Int(1)], vec![ScanValue::Int(2)]],
                )
                .with_result(
                    "REPORTING",
                    vec!["total"],
                    vec![
                        vec![ScanValue::Int(10)],
                        vec![ScanValue::Int(20)],
                        vec![ScanValue::Int(30)],
                        vec![ScanValue::Int(40)],
                        vec![ScanValue::Int(50)],
                    ],
                ),
        );
        let service = QueryService::new(Arc::new(registry()), provider.clone());

        let main_request = request("SELECT id FROM t", 0);
        let reporting_request = request("SELECT total FROM r", 1);
        let (main, reporting) = tokio::join!(
            service.execute(&main_request),
            service.execute(&reporting_request),
        );

        let main = main.unwrap();
        let reporting = reporting.unwrap();

        assert_eq!(main.columns, vec!["id"]);
        assert_eq!(main.rows.len(), 2);
        assert_eq!(reporting.columns, vec!["total"]);
        assert_eq!(reporting.rows.len(), 5);
        // One dedicated connection per request
        assert_eq!(provider.connect_count(), 2);
        assert_eq!(provider.close_count(), 2);
    }

    #[test]
    fn encode_preserves_cursor_order() {
        let result = encode_result(
            vec!["n".to_string()],
            vec![
                vec![ScanValue::Int(3)],
                vec![ScanValue::Int(1)],
                vec![ScanValue::Int(2)],
            ],
        );

        let values: Vec<_> = result.rows.iter().map(|r| r["n"].clone()).collect();
        assert_eq!(values, vec![json!(3), json!(1), json!(2)]);
    }
}
