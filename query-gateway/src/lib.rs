//! SQL query gateway.
//!
//! Accepts a SQL statement and a source index over HTTP, resolves the
//! credentials configured for that source, opens a dedicated database
//! connection, executes the query, and returns the materialized result
//! set as JSON.

pub mod db;
pub mod handlers;
pub mod routes;
pub mod service;
pub mod state;
