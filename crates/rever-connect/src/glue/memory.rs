//! In-memory Glue catalog for testing.
//!
//! [`InMemoryGlue`] implements [`GlueCatalog`] over a map of databases and
//! tables, records every write, and can be told to fail specific entities.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use aws_sdk_glue::types::{Column, Database, DatabaseInput, StorageDescriptor, Table, TableInput};

use rever_core::ErrorKind;

use super::SYSTEM;
use super::client::{DatabasePage, GlueCatalog};
use crate::error::TargetError;

/// A write the fake accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlueWrite {
    /// `UpdateDatabase` for this database.
    Database(String),
    /// `UpdateTable` for `database.table`.
    Table(String),
}

#[derive(Debug, Default)]
struct GlueState {
    databases: Vec<Database>,
    tables: HashMap<String, Table>,
    failures: HashMap<String, ErrorKind>,
    writes: Vec<GlueWrite>,
}

/// In-memory [`GlueCatalog`].
#[derive(Debug)]
pub struct InMemoryGlue {
    state: Mutex<GlueState>,
    page_size: usize,
}

impl Default for InMemoryGlue {
    fn default() -> Self {
        Self {
            state: Mutex::new(GlueState::default()),
            page_size: 100,
        }
    }
}

fn key(database: &str, table: &str) -> String {
    format!("{database}.{table}")
}

impl InMemoryGlue {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits `GetDatabases` pages to `size` entries.
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, GlueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a database.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn add_database(&self, name: &str, description: Option<&str>) {
        let database = Database::builder()
            .name(name)
            .set_description(description.map(str::to_string))
            .build()
            .expect("database name is set");
        self.state().databases.push(database);
    }

    /// Adds a table with `(name, comment)` columns.
    ///
    /// # Panics
    ///
    /// Panics if a name is empty.
    pub fn add_table(
        &self,
        database: &str,
        name: &str,
        description: Option<&str>,
        columns: &[(&str, Option<&str>)],
    ) {
        let columns = columns
            .iter()
            .map(|(column, comment)| {
                Column::builder()
                    .name(*column)
                    .r#type("string")
                    .set_comment(comment.map(str::to_string))
                    .build()
                    .expect("column name is set")
            })
            .collect();
        let table = Table::builder()
            .name(name)
            .database_name(database)
            .set_description(description.map(str::to_string))
            .storage_descriptor(StorageDescriptor::builder().set_columns(Some(columns)).build())
            .build()
            .expect("table name is set");
        self.state().tables.insert(key(database, name), table);
    }

    /// Makes every call touching `entity` (database or `database.table`) fail.
    pub fn fail_on(&self, entity: &str, kind: ErrorKind) {
        self.state().failures.insert(entity.to_string(), kind);
    }

    /// Current description of a database.
    #[must_use]
    pub fn database_description(&self, name: &str) -> Option<String> {
        self.state()
            .databases
            .iter()
            .find(|d| d.name() == name)
            .and_then(|d| d.description.clone())
    }

    /// Current state of a table.
    #[must_use]
    pub fn table(&self, database: &str, name: &str) -> Option<Table> {
        self.state().tables.get(&key(database, name)).cloned()
    }

    /// Current comment of a column.
    #[must_use]
    pub fn column_comment(&self, database: &str, table: &str, column: &str) -> Option<String> {
        let table = self.table(database, table)?;
        table
            .storage_descriptor()?
            .columns()
            .iter()
            .find(|c| c.name() == column)
            .and_then(|c| c.comment().map(str::to_string))
    }

    /// Every accepted write, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<GlueWrite> {
        self.state().writes.clone()
    }

    fn check(&self, entity: &str, operation: &str) -> Result<(), TargetError> {
        match self.state().failures.get(entity) {
            Some(kind) => Err(TargetError::new(
                SYSTEM,
                *kind,
                format!("{operation} {entity}: injected failure"),
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GlueCatalog for InMemoryGlue {
    async fn get_databases(&self, next_token: Option<String>) -> Result<DatabasePage, TargetError> {
        let start = match next_token.as_deref() {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| TargetError::malformed(SYSTEM, format!("bad token {token}")))?,
        };
        let state = self.state();
        let end = (start + self.page_size).min(state.databases.len());
        let databases = state.databases.get(start..end).unwrap_or_default().to_vec();
        let next_token = (end < state.databases.len()).then(|| end.to_string());
        Ok(DatabasePage {
            databases,
            next_token,
        })
    }

    async fn update_database(&self, name: &str, input: DatabaseInput) -> Result<(), TargetError> {
        self.check(name, "UpdateDatabase")?;
        let mut state = self.state();
        let database = state
            .databases
            .iter_mut()
            .find(|d| d.name() == name)
            .ok_or_else(|| TargetError::not_found(SYSTEM, format!("database {name}")))?;
        database.description = input.description;
        state.writes.push(GlueWrite::Database(name.to_string()));
        Ok(())
    }

    async fn get_table(&self, database: &str, table: &str) -> Result<Table, TargetError> {
        let entity = key(database, table);
        self.check(&entity, "GetTable")?;
        self.state()
            .tables
            .get(&entity)
            .cloned()
            .ok_or_else(|| TargetError::not_found(SYSTEM, format!("table {entity}")))
    }

    async fn update_table(&self, database: &str, input: TableInput) -> Result<(), TargetError> {
        let entity = key(database, input.name());
        self.check(&entity, "UpdateTable")?;
        let mut state = self.state();
        let table = state
            .tables
            .get_mut(&entity)
            .ok_or_else(|| TargetError::not_found(SYSTEM, format!("table {entity}")))?;
        table.description = input.description;
        table.storage_descriptor = input.storage_descriptor;
        state.writes.push(GlueWrite::Table(entity));
        Ok(())
    }
}
