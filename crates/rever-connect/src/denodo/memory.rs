//! In-memory VDP server for testing.
//!
//! [`InMemoryVdp`] answers the catalog functions from its own tables and
//! records every statement it is asked to execute, per database.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use rever_core::ErrorKind;

use super::VDP_SYSTEM;
use super::vdp::{VdpCatalog, VdpDatabase, VdpView, VdpViewColumn};
use crate::error::TargetError;

#[derive(Debug, Default)]
struct VdpState {
    databases: Vec<VdpDatabase>,
    views: Vec<VdpView>,
    columns: Vec<VdpViewColumn>,
    executed: Vec<(String, String)>,
    failures: HashMap<String, ErrorKind>,
    reads: usize,
}

/// In-memory [`VdpCatalog`].
#[derive(Debug, Default)]
pub struct InMemoryVdp {
    state: Mutex<VdpState>,
}

impl InMemoryVdp {
    /// Creates an empty server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, VdpState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a database.
    pub fn add_database(&self, name: &str, description: Option<&str>) {
        self.state().databases.push(VdpDatabase {
            db_name: name.to_string(),
            description: description.map(str::to_string),
        });
    }

    /// Adds a view with `(column, remarks)` columns.
    pub fn add_view(
        &self,
        database: &str,
        name: &str,
        view_type: i32,
        description: Option<&str>,
        columns: &[(&str, Option<&str>)],
    ) {
        let mut state = self.state();
        state.views.push(VdpView {
            database_name: database.to_string(),
            name: name.to_string(),
            view_type,
            description: description.map(str::to_string),
        });
        for (column, remarks) in columns {
            state.columns.push(VdpViewColumn {
                database_name: database.to_string(),
                view_type,
                view_name: name.to_string(),
                column_name: (*column).to_string(),
                column_remarks: remarks.map(str::to_string),
            });
        }
    }

    /// Makes statements run against `database` fail with `kind`.
    pub fn fail_statements_in(&self, database: &str, kind: ErrorKind) {
        self.state().failures.insert(database.to_string(), kind);
    }

    /// Every executed `(database, statement)`, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<(String, String)> {
        self.state().executed.clone()
    }

    /// Number of catalog-function queries answered.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.state().reads
    }
}

#[async_trait]
impl VdpCatalog for InMemoryVdp {
    async fn databases(&self) -> Result<Vec<VdpDatabase>, TargetError> {
        let mut state = self.state();
        state.reads += 1;
        Ok(state.databases.clone())
    }

    async fn views(&self, database: &str) -> Result<Vec<VdpView>, TargetError> {
        let mut state = self.state();
        state.reads += 1;
        Ok(state
            .views
            .iter()
            .filter(|v| v.database_name == database)
            .cloned()
            .collect())
    }

    async fn view_columns(&self, database: &str) -> Result<Vec<VdpViewColumn>, TargetError> {
        let mut state = self.state();
        state.reads += 1;
        Ok(state
            .columns
            .iter()
            .filter(|c| c.database_name == database)
            .cloned()
            .collect())
    }

    async fn execute(&self, database: &str, statement: &str) -> Result<(), TargetError> {
        let mut state = self.state();
        if let Some(kind) = state.failures.get(database) {
            return Err(TargetError::new(
                VDP_SYSTEM,
                *kind,
                format!("{statement}: injected failure"),
            ));
        }
        state
            .executed
            .push((database.to_string(), statement.to_string()));
        Ok(())
    }
}
