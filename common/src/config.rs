//! Process-wide configuration.
//!
//! All settings are read from the environment once at startup and are
//! immutable afterwards, so request handlers can share them behind an
//! `Arc` without any locking.
//!
//! Database sources are declared as `DB_DSN_<n>` entries: each maps a
//! small integer source index to a database name. Host, port, user and
//! password are shared by every source.

use std::collections::BTreeMap;
use std::env;

use crate::errors::{AppError, AppResult};

/// Environment prefix for per-source database names.
const SOURCE_KEY_PREFIX: &str = "DB_DSN_";

/// Default port the gateway listens on.
const DEFAULT_PORT: u16 = 40500;

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address for the HTTP listener.
    pub host: String,
    /// Bind port for the HTTP listener.
    pub port: u16,
    /// Database source registry.
    pub registry: SourceRegistry,
}

impl AppConfig {
    /// Loads the full configuration from the environment.
    ///
    /// # Errors
    /// Returns `AppError::Config` if a required database setting is
    /// missing or no source entries are declared.
    pub fn from_env() -> AppResult<Self> {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            host,
            port,
            registry: SourceRegistry::from_env()?,
        })
    }
}

/// Immutable table mapping source indices to database names, plus the
/// connection settings shared by all sources.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    db_host: String,
    db_port: String,
    db_user: String,
    db_password: String,
    databases: BTreeMap<u32, String>,
}

impl SourceRegistry {
    /// Creates a registry with the shared connection settings and no
    /// sources.
    pub fn new(
        db_host: impl Into<String>,
        db_port: impl Into<String>,
        db_user: impl Into<String>,
        db_password: impl Into<String>,
    ) -> Self {
        Self {
            db_host: db_host.into(),
            db_port: db_port.into(),
            db_user: db_user.into(),
            db_password: db_password.into(),
            databases: BTreeMap::new(),
        }
    }

    /// Registers a database name under the given source index.
    pub fn with_source(mut self, index: u32, database: impl Into<String>) -> Self {
        self.databases.insert(index, database.into());
        self
    }

    /// Builds the registry from `DB_HOST`, `DB_PORT`, `DB_USER`,
    /// `DB_PASSWORD` and every `DB_DSN_<n>` entry in the environment.
    ///
    /// # Errors
    /// Returns `AppError::Config` if a shared setting is missing or no
    /// `DB_DSN_<n>` entry exists.
    pub fn from_env() -> AppResult<Self> {
        let mut registry = Self::new(
            require_env("DB_HOST")?,
            require_env("DB_PORT")?,
            require_env("DB_USER")?,
            env::var("DB_PASSWORD").unwrap_or_default(),
        );

        for (key, value) in env::vars() {
            if let Some(index) = parse_source_key(&key) {
                registry.databases.insert(index, value);
            }
        }

        if registry.databases.is_empty() {
            return Err(AppError::Config(format!(
                "no {SOURCE_KEY_PREFIX}<n> entries found in environment"
            )));
        }

        Ok(registry)
    }

    /// Resolves a source index to a full set of connection credentials.
    ///
    /// # Errors
    /// Returns `AppError::SourceNotFound` if no database is registered
    /// under the given index. This short-circuits before any connection
    /// attempt.
    pub fn resolve(&self, source: u32) -> AppResult<SourceCredentials> {
        let database = self
            .databases
            .get(&source)
            .ok_or(AppError::SourceNotFound(source))?;

        Ok(SourceCredentials {
            host: self.db_host.clone(),
            port: self.db_port.clone(),
            database: database.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
        })
    }

    /// Returns the number of registered sources.
    pub fn len(&self) -> usize {
        self.databases.len()
    }

    /// Returns true if no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }
}

/// Connection credentials for a single resolved source.
///
/// Constructed fresh per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCredentials {
    pub host: String,
    pub port: String,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl SourceCredentials {
    /// Checks that every field required for a connection attempt is
    /// non-empty. An empty password is allowed.
    ///
    /// # Errors
    /// Returns `AppError::Connection` naming the first empty field.
    pub fn ensure_complete(&self) -> AppResult<()> {
        for (name, value) in [
            ("host", &self.host),
            ("port", &self.port),
            ("database", &self.database),
            ("user", &self.user),
        ] {
            if value.is_empty() {
                return Err(AppError::Connection(format!(
                    "credential field `{name}` is empty"
                )));
            }
        }
        Ok(())
    }
}

fn require_env(key: &str) -> AppResult<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{key} not set in environment"))),
    }
}

/// Extracts the source index from a `DB_DSN_<n>` environment key.
fn parse_source_key(key: &str) -> Option<u32> {
    key.strip_prefix(SOURCE_KEY_PREFIX)?.parse().ok()
}
