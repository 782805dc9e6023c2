//! Copies live Glue definitions into update inputs.
//!
//! Glue updates replace the whole definition, so every field the input
//! shares with the live object is carried over.

use aws_sdk_glue::types::{Database, DatabaseInput, Table, TableInput};

use super::SYSTEM;
use crate::error::TargetError;

/// Builds a [`DatabaseInput`] equal to `database`.
///
/// # Errors
///
/// Returns a malformed error if the database has no name.
pub fn database_input(database: &Database) -> Result<DatabaseInput, TargetError> {
    DatabaseInput::builder()
        .name(database.name())
        .set_description(database.description().map(str::to_string))
        .set_location_uri(database.location_uri().map(str::to_string))
        .set_parameters(database.parameters().cloned())
        .set_create_table_default_permissions(Some(
            database.create_table_default_permissions().to_vec(),
        ))
        .set_target_database(database.target_database().cloned())
        .set_federated_database(database.federated_database().cloned())
        .build()
        .map_err(|e| {
            TargetError::malformed(SYSTEM, format!("cannot copy database {}", database.name()))
                .with_source(e)
        })
}

/// Builds a [`TableInput`] equal to `table`.
///
/// # Errors
///
/// Returns a malformed error if the table has no name.
pub fn table_input(table: &Table) -> Result<TableInput, TargetError> {
    TableInput::builder()
        .name(table.name())
        .set_description(table.description().map(str::to_string))
        .set_owner(table.owner().map(str::to_string))
        .set_last_access_time(table.last_access_time().cloned())
        .set_last_analyzed_time(table.last_analyzed_time().cloned())
        .retention(table.retention())
        .set_storage_descriptor(table.storage_descriptor().cloned())
        .set_partition_keys(Some(table.partition_keys().to_vec()))
        .set_view_original_text(table.view_original_text().map(str::to_string))
        .set_view_expanded_text(table.view_expanded_text().map(str::to_string))
        .set_table_type(table.table_type().map(str::to_string))
        .set_parameters(table.parameters().cloned())
        .set_target_table(table.target_table().cloned())
        .build()
        .map_err(|e| {
            TargetError::malformed(SYSTEM, format!("cannot copy table {}", table.name()))
                .with_source(e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_glue::types::{Column, StorageDescriptor};
    use std::collections::HashMap;

    #[test]
    fn database_copy_keeps_fields() {
        let database = Database::builder()
            .name("sales_db")
            .description("user text")
            .location_uri("s3://bucket/sales")
            .set_parameters(Some(HashMap::from([("k".to_string(), "v".to_string())])))
            .build()
            .unwrap();
        let input = database_input(&database).unwrap();
        assert_eq!(input.name(), "sales_db");
        assert_eq!(input.description(), Some("user text"));
        assert_eq!(input.location_uri(), Some("s3://bucket/sales"));
        assert_eq!(input.parameters().unwrap()["k"], "v");
    }

    #[test]
    fn table_copy_keeps_columns_and_type() {
        let columns = vec![
            Column::builder().name("amount").r#type("decimal").build().unwrap(),
            Column::builder()
                .name("currency")
                .r#type("string")
                .comment("iso code")
                .build()
                .unwrap(),
        ];
        let table = Table::builder()
            .name("orders")
            .table_type("EXTERNAL_TABLE")
            .storage_descriptor(
                StorageDescriptor::builder()
                    .set_columns(Some(columns))
                    .location("s3://bucket/orders")
                    .build(),
            )
            .build()
            .unwrap();
        let input = table_input(&table).unwrap();
        assert_eq!(input.name(), "orders");
        assert_eq!(input.table_type(), Some("EXTERNAL_TABLE"));
        assert_eq!(input.description(), None);
        let sd = input.storage_descriptor().unwrap();
        assert_eq!(sd.columns().len(), 2);
        assert_eq!(sd.columns()[1].comment(), Some("iso code"));
        assert_eq!(sd.location(), Some("s3://bucket/orders"));
    }
}
