//! Query request and result models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for the query endpoint.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct QueryRequest {
    /// SQL statement to execute, passed to the driver verbatim.
    #[validate(length(min = 1, message = "query must not be empty"))]
    pub query: String,

    /// Source index selecting which configured database to query.
    /// Defaults to source 0 when omitted.
    #[serde(default)]
    pub source: u32,
}

/// Result of a query execution.
///
/// Row objects always carry exactly the keys listed in `columns`, and
/// rows appear in cursor iteration order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryResult {
    /// Ordered column names from the query result.
    pub columns: Vec<String>,

    /// Result rows, each keyed by column name.
    #[serde(rename = "data")]
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}
