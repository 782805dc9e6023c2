//! VDP access over the PostgreSQL wire protocol.
//!
//! Reads go through the VDP catalog functions (`get_databases()`,
//! `get_views()`, `get_view_columns()`); writes are VQL `ALTER` statements
//! built with escaped literals. A NULL description is the unset state.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use tokio::sync::Mutex;

use rever_core::Redacted;

use super::VDP_SYSTEM;
use crate::error::TargetError;

/// Time to wait for a VDP connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// A row of `get_databases()`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VdpDatabase {
    /// Database name.
    pub db_name: String,
    /// Description; `None` when unset.
    pub description: Option<String>,
}

/// A row of `get_views()`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VdpView {
    /// Database the view belongs to.
    pub database_name: String,
    /// View name.
    pub name: String,
    /// Raw view type code.
    pub view_type: i32,
    /// Description; `None` when unset.
    pub description: Option<String>,
}

/// A row of `get_view_columns()` joined with its view.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VdpViewColumn {
    /// Database the view belongs to.
    pub database_name: String,
    /// Raw view type code.
    pub view_type: i32,
    /// View name.
    pub view_name: String,
    /// Column name.
    pub column_name: String,
    /// Column description; `None` when unset.
    pub column_remarks: Option<String>,
}

/// Kinds of VDP views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VdpViewType {
    /// Base view over a data source, altered as `TABLE`.
    Base,
    /// Derived view; the only kind whose columns accept descriptions.
    Derived,
    /// Interface view.
    Interface,
    /// Materialized view.
    Materialized,
    /// Any other code.
    Other(i32),
}

impl VdpViewType {
    /// Decodes a `view_type` code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Base,
            1 => Self::Derived,
            2 => Self::Interface,
            3 => Self::Materialized,
            other => Self::Other(other),
        }
    }

    /// VQL keyword used to alter a view of this kind.
    #[must_use]
    pub const fn alter_keyword(self) -> &'static str {
        match self {
            Self::Base => "TABLE",
            _ => "VIEW",
        }
    }
}

/// Escapes a VQL string literal body by doubling single quotes.
#[must_use]
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Quotes an identifier unless it is a plain word.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// `ALTER DATABASE db '..'`
#[must_use]
pub fn alter_database_statement(database: &str, description: &str) -> String {
    format!(
        "ALTER DATABASE {} '{}'",
        quote_identifier(database),
        escape_literal(description)
    )
}

/// `ALTER TABLE|VIEW v DESCRIPTION = '..'`
#[must_use]
pub fn alter_view_statement(view: &VdpView, description: &str) -> String {
    format!(
        "ALTER {} {} DESCRIPTION = '{}'",
        VdpViewType::from_code(view.view_type).alter_keyword(),
        quote_identifier(&view.name),
        escape_literal(description)
    )
}

/// `ALTER VIEW v (ALTER COLUMN c ADD (DESCRIPTION = '..'))`
#[must_use]
pub fn alter_column_statement(column: &VdpViewColumn, description: &str) -> String {
    format!(
        "ALTER {} {} (ALTER COLUMN {} ADD (DESCRIPTION = '{}'))",
        VdpViewType::from_code(column.view_type).alter_keyword(),
        quote_identifier(&column.view_name),
        quote_identifier(&column.column_name),
        escape_literal(description)
    )
}

/// Read and write access to VDP.
#[async_trait]
pub trait VdpCatalog: Debug + Send + Sync {
    /// Lists every database.
    async fn databases(&self) -> Result<Vec<VdpDatabase>, TargetError>;

    /// Lists the views of `database`.
    async fn views(&self, database: &str) -> Result<Vec<VdpView>, TargetError>;

    /// Lists the columns of every view in `database`.
    async fn view_columns(&self, database: &str) -> Result<Vec<VdpViewColumn>, TargetError>;

    /// Runs a VQL statement while connected to `database`.
    async fn execute(&self, database: &str, statement: &str) -> Result<(), TargetError>;
}

#[async_trait]
impl<T: VdpCatalog + ?Sized> VdpCatalog for Arc<T> {
    async fn databases(&self) -> Result<Vec<VdpDatabase>, TargetError> {
        (**self).databases().await
    }

    async fn views(&self, database: &str) -> Result<Vec<VdpView>, TargetError> {
        (**self).views(database).await
    }

    async fn view_columns(&self, database: &str) -> Result<Vec<VdpViewColumn>, TargetError> {
        (**self).view_columns(database).await
    }

    async fn execute(&self, database: &str, statement: &str) -> Result<(), TargetError> {
        (**self).execute(database, statement).await
    }
}

/// Connection settings for VDP.
#[derive(Debug, Clone)]
pub struct VdpConnectConfig {
    /// Server host name.
    pub host: String,
    /// ODBC (PostgreSQL wire) port.
    pub port: u16,
    /// Database used for server-wide queries.
    pub default_database: String,
    /// User name.
    pub username: String,
    /// Password.
    pub password: Redacted<String>,
}

impl VdpConnectConfig {
    fn options(&self, database: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose())
            .database(database)
            .ssl_mode(PgSslMode::Require)
    }
}

fn classify(operation: &str, error: sqlx::Error) -> TargetError {
    let message = format!("{operation}: {error}");
    let target = match &error {
        sqlx::Error::RowNotFound => TargetError::not_found(VDP_SYSTEM, message),
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("42501") => TargetError::permission_denied(VDP_SYSTEM, message),
            Some("3D000" | "42P01" | "42704") => TargetError::not_found(VDP_SYSTEM, message),
            _ => TargetError::other(VDP_SYSTEM, message),
        },
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            TargetError::malformed(VDP_SYSTEM, message)
        }
        _ => TargetError::other(VDP_SYSTEM, message),
    };
    target.with_source(error)
}

/// [`VdpCatalog`] over `sqlx`, with one small pool per database.
#[derive(Debug)]
pub struct SqlxVdpClient {
    config: VdpConnectConfig,
    pools: Mutex<HashMap<String, PgPool>>,
}

impl SqlxVdpClient {
    /// Creates a client; connections are opened on first use.
    #[must_use]
    pub fn new(config: VdpConnectConfig) -> Self {
        Self {
            config,
            pools: Mutex::new(HashMap::new()),
        }
    }

    async fn pool(&self, database: &str) -> Result<PgPool, TargetError> {
        let mut pools = self.pools.lock().await;
        if let Some(pool) = pools.get(database) {
            return Ok(pool.clone());
        }
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect_with(self.config.options(database))
            .await
            .map_err(|e| classify(&format!("connect to {database}"), e))?;
        tracing::debug!(database, "connected to vdp");
        pools.insert(database.to_string(), pool.clone());
        Ok(pool)
    }

    /// Closes every open connection.
    pub async fn close(&self) {
        for (_, pool) in self.pools.lock().await.drain() {
            pool.close().await;
        }
    }
}

#[async_trait]
impl VdpCatalog for SqlxVdpClient {
    async fn databases(&self) -> Result<Vec<VdpDatabase>, TargetError> {
        let pool = self.pool(&self.config.default_database).await?;
        sqlx::query_as::<_, VdpDatabase>("SELECT db_name, description FROM get_databases()")
            .fetch_all(&pool)
            .await
            .map_err(|e| classify("get_databases", e))
    }

    async fn views(&self, database: &str) -> Result<Vec<VdpView>, TargetError> {
        let pool = self.pool(database).await?;
        sqlx::query_as::<_, VdpView>(
            r#"
SELECT database_name, name, view_type, description
FROM get_views()
WHERE database_name = $1;
            "#,
        )
        .bind(database)
        .fetch_all(&pool)
        .await
        .map_err(|e| classify("get_views", e))
    }

    async fn view_columns(&self, database: &str) -> Result<Vec<VdpViewColumn>, TargetError> {
        let pool = self.pool(database).await?;
        sqlx::query_as::<_, VdpViewColumn>(
            r#"
SELECT gvc.database_name, gv.view_type, gvc.view_name, gvc.column_name, gvc.column_remarks
FROM get_view_columns() gvc
INNER JOIN get_views() gv
  ON gvc.database_name = gv.database_name AND gvc.view_name = gv.name
WHERE gvc.database_name = $1;
            "#,
        )
        .bind(database)
        .fetch_all(&pool)
        .await
        .map_err(|e| classify("get_view_columns", e))
    }

    async fn execute(&self, database: &str, statement: &str) -> Result<(), TargetError> {
        let pool = self.pool(database).await?;
        sqlx::raw_sql(statement)
            .execute(&pool)
            .await
            .map_err(|e| classify("alter", e))?;
        Ok(())
    }
}
