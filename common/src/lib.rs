//! Shared building blocks for the query gateway.
//!
//! Contains the configuration layer (source registry and credentials),
//! the error taxonomy, wire models, and request middleware.

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;

// Re-export commonly used types
pub use config::{AppConfig, SourceCredentials, SourceRegistry};
pub use errors::{AppError, AppResult};
