//! Wire and scan models shared across the workspace.

pub mod query;
pub mod value;

// Re-export commonly used types
pub use query::{QueryRequest, QueryResult};
pub use value::ScanValue;
