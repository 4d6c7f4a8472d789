//! MySQL connection provider backed by sqlx.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use common::config::SourceCredentials;
use common::errors::{AppError, AppResult};
use common::models::ScanValue;
use sqlx::mysql::{MySqlColumn, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Connection, Executor, MySql, Row, Statement, TypeInfo};

use super::{ConnectionProvider, DbConnection, ScannedRows};

/// Dials one dedicated MySQL connection per request.
pub struct MySqlProvider;

#[async_trait]
impl ConnectionProvider for MySqlProvider {
    async fn connect(&self, creds: &SourceCredentials) -> AppResult<Box<dyn DbConnection>> {
        // Incomplete credentials fail here, before any network I/O.
        creds.ensure_complete()?;

        let mut conn = connect_options(creds)?
            .connect()
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;

        if let Err(e) = conn.ping().await {
            let _ = conn.close().await;
            return Err(AppError::Connection(e.to_string()));
        }

        Ok(Box::new(MySqlQueryConnection { conn }))
    }
}

/// Builds the driver connect options from the five credential fields.
///
/// The field layout is fixed, so the same credentials always produce
/// the same options. Building field-by-field keeps passwords with URL
/// metacharacters intact.
fn connect_options(creds: &SourceCredentials) -> AppResult<MySqlConnectOptions> {
    let port: u16 = creds
        .port
        .parse()
        .map_err(|_| AppError::Connection(format!("invalid port `{}`", creds.port)))?;

    Ok(MySqlConnectOptions::new()
        .host(&creds.host)
        .port(port)
        .username(&creds.user)
        .password(&creds.password)
        .database(&creds.database))
}

struct MySqlQueryConnection {
    conn: MySqlConnection,
}

#[async_trait]
impl DbConnection for MySqlQueryConnection {
    async fn fetch_all(&mut self, query: &str) -> AppResult<ScannedRows> {
        let statement = self
            .conn
            .prepare(query)
            .await
            .map_err(|e| AppError::Execution(e.to_string()))?;

        // Column metadata comes from the prepared statement, so a
        // zero-row result still carries its schema.
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let rows = statement
            .query()
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| AppError::Execution(e.to_string()))?;

        let mut scanned = Vec::with_capacity(rows.len());
        for row in &rows {
            scanned.push(scan_row(row)?);
        }

        Ok((columns, scanned))
    }

    async fn close(self: Box<Self>) {
        let _ = self.conn.close().await;
    }
}

/// Scans every cell of a driver row into a tagged value.
fn scan_row(row: &MySqlRow) -> AppResult<Vec<ScanValue>> {
    row.columns()
        .iter()
        .map(|col| scan_value(row, col))
        .collect()
}

/// Decodes one cell based on the driver-reported column type.
///
/// Variable-length binary columns are scanned as raw bytes so the
/// encoder can apply the byte-to-text normalization explicitly.
/// CHAR/VARCHAR/TEXT/ENUM/SET/DECIMAL/JSON and any unrecognized type
/// are scanned as character data.
fn scan_value(row: &MySqlRow, col: &MySqlColumn) -> AppResult<ScanValue> {
    let index = col.ordinal();

    match col.type_info().name() {
        "BOOLEAN" => decode(row, index, ScanValue::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            decode(row, index, ScanValue::Int)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => decode(row, index, ScanValue::UInt),
        "BIT" => decode(row, index, ScanValue::UInt),
        "FLOAT" => decode(row, index, |v: f32| ScanValue::Float(f64::from(v))),
        "DOUBLE" => decode(row, index, ScanValue::Float),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            decode(row, index, ScanValue::Bytes)
        }
        "DATE" => decode(row, index, |v: NaiveDate| ScanValue::Text(v.to_string())),
        "TIME" => decode(row, index, |v: NaiveTime| ScanValue::Text(v.to_string())),
        "DATETIME" => decode(row, index, |v: NaiveDateTime| ScanValue::Text(v.to_string())),
        "TIMESTAMP" => decode(row, index, |v: DateTime<Utc>| {
            ScanValue::Text(v.to_rfc3339())
        }),
        _ => decode(row, index, ScanValue::Text),
    }
}

fn decode<'r, T>(
    row: &'r MySqlRow,
    index: usize,
    wrap: impl FnOnce(T) -> ScanValue,
) -> AppResult<ScanValue>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    match row.try_get::<Option<T>, _>(index) {
        Ok(Some(value)) => Ok(wrap(value)),
        Ok(None) => Ok(ScanValue::Null),
        Err(e) => Err(AppError::Execution(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn creds(password: &str) -> SourceCredentials {
        SourceCredentials {
            host: "db.internal".into(),
            port: "50000".into(),
            database: "LOGISTICS".into(),
            user: "svc".into(),
            password: password.into(),
        }
    }

    #[test]
    fn connect_options_carry_every_credential_field() {
        let options = connect_options(&creds("secret")).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 50000);
        assert_eq!(options.get_username(), "svc");
        assert_eq!(options.get_database(), Some("LOGISTICS"));
    }

    #[test]
    fn url_metacharacters_in_the_password_are_accepted() {
        assert!(connect_options(&creds("p@ss/w#rd:!")).is_ok());
    }

    #[test]
    fn non_numeric_port_is_a_connection_error() {
        let mut bad = creds("secret");
        bad.port = "fifty".into();
        let err = connect_options(&bad).unwrap_err();
        assert!(matches!(err, AppError::Connection(_)));
    }
}
