use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_glue::Client;
use aws_sdk_glue::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_glue::types::{Database, DatabaseInput, ResourceShareType, Table, TableInput};

use super::{DEFAULT_REGION, SYSTEM};
use crate::error::TargetError;

/// One page of `GetDatabases`.
#[derive(Debug, Clone, Default)]
pub struct DatabasePage {
    /// Databases on this page.
    pub databases: Vec<Database>,
    /// Token for the next page, if any.
    pub next_token: Option<String>,
}

/// The Glue operations the adapter needs.
#[async_trait]
pub trait GlueCatalog: Debug + Send + Sync {
    /// Lists databases, including ones shared with the account.
    async fn get_databases(&self, next_token: Option<String>) -> Result<DatabasePage, TargetError>;

    /// Replaces a database definition.
    async fn update_database(&self, name: &str, input: DatabaseInput) -> Result<(), TargetError>;

    /// Reads a table definition.
    async fn get_table(&self, database: &str, table: &str) -> Result<Table, TargetError>;

    /// Replaces a table definition.
    async fn update_table(&self, database: &str, input: TableInput) -> Result<(), TargetError>;
}

#[async_trait]
impl<T: GlueCatalog + ?Sized> GlueCatalog for Arc<T> {
    async fn get_databases(&self, next_token: Option<String>) -> Result<DatabasePage, TargetError> {
        (**self).get_databases(next_token).await
    }

    async fn update_database(&self, name: &str, input: DatabaseInput) -> Result<(), TargetError> {
        (**self).update_database(name, input).await
    }

    async fn get_table(&self, database: &str, table: &str) -> Result<Table, TargetError> {
        (**self).get_table(database, table).await
    }

    async fn update_table(&self, database: &str, input: TableInput) -> Result<(), TargetError> {
        (**self).update_table(database, input).await
    }
}

/// Settings for [`AwsGlueClient`].
#[derive(Debug, Clone, Default)]
pub struct GlueClientConfig {
    /// Account that owns the catalog.
    pub account_id: String,
    /// Region; defaults to [`DEFAULT_REGION`].
    pub region: Option<String>,
    /// Shared-config profile to load credentials from.
    pub profile: Option<String>,
    /// Role to assume before calling Glue.
    pub role_arn: Option<String>,
}

/// Maps an AWS error code onto the shared taxonomy.
pub fn classify_sdk_error<E>(operation: &str, error: E) -> TargetError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message = format!("{operation}: {}", DisplayErrorContext(&error));
    let target = match error.code() {
        Some("EntityNotFoundException") => TargetError::not_found(SYSTEM, message),
        Some("AccessDeniedException" | "InvalidGrantException") => {
            TargetError::permission_denied(SYSTEM, message)
        }
        _ => TargetError::other(SYSTEM, message),
    };
    target.with_source(error)
}

/// [`GlueCatalog`] over the AWS SDK.
#[derive(Debug, Clone)]
pub struct AwsGlueClient {
    client: Client,
    account_id: String,
}

impl AwsGlueClient {
    /// Loads AWS configuration and, when a role is configured, assumes it.
    pub async fn connect(config: GlueClientConfig) -> Self {
        let region = Region::new(
            config
                .region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        );
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region.clone());
        if let Some(profile) = config.profile.as_deref() {
            loader = loader.profile_name(profile);
        }
        let mut sdk_config = loader.load().await;

        if let Some(role_arn) = config.role_arn.as_deref() {
            tracing::debug!(role_arn, "assuming role for glue");
            let provider = AssumeRoleProvider::builder(role_arn)
                .session_name("rever")
                .configure(&sdk_config)
                .build()
                .await;
            sdk_config = aws_config::defaults(BehaviorVersion::latest())
                .region(region)
                .credentials_provider(provider)
                .load()
                .await;
        }

        Self {
            client: Client::new(&sdk_config),
            account_id: config.account_id,
        }
    }
}

#[async_trait]
impl GlueCatalog for AwsGlueClient {
    async fn get_databases(&self, next_token: Option<String>) -> Result<DatabasePage, TargetError> {
        let output = self
            .client
            .get_databases()
            .catalog_id(&self.account_id)
            .resource_share_type(ResourceShareType::All)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| classify_sdk_error("GetDatabases", e))?;
        Ok(DatabasePage {
            databases: output.database_list().to_vec(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn update_database(&self, name: &str, input: DatabaseInput) -> Result<(), TargetError> {
        self.client
            .update_database()
            .catalog_id(&self.account_id)
            .name(name)
            .database_input(input)
            .send()
            .await
            .map_err(|e| classify_sdk_error("UpdateDatabase", e))?;
        Ok(())
    }

    async fn get_table(&self, database: &str, table: &str) -> Result<Table, TargetError> {
        let output = self
            .client
            .get_table()
            .catalog_id(&self.account_id)
            .database_name(database)
            .name(table)
            .send()
            .await
            .map_err(|e| classify_sdk_error("GetTable", e))?;
        output.table().cloned().ok_or_else(|| {
            TargetError::malformed(SYSTEM, format!("GetTable {database}.{table} returned no table"))
        })
    }

    async fn update_table(&self, database: &str, input: TableInput) -> Result<(), TargetError> {
        self.client
            .update_table()
            .catalog_id(&self.account_id)
            .database_name(database)
            .table_input(input)
            .send()
            .await
            .map_err(|e| classify_sdk_error("UpdateTable", e))?;
        Ok(())
    }
}
