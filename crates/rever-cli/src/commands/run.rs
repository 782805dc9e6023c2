//! Run command - reconcile catalog descriptions into one target system.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use rever_catalog::{CatalogClient, CatalogClientConfig, CatalogSource};
use rever_connect::bigquery::{self, BigQueryAdapter, BigQueryClient, BigQueryConfig, GcpTokenSource};
use rever_connect::denodo::{
    self, DenodoLocalClient, LocalCatalogAdapter, LocalClientConfig, SqlxVdpClient, VdpAdapter,
    VdpConnectConfig,
};
use rever_connect::glue::{self, AwsGlueClient, GlueAdapter, GlueClientConfig};
use rever_connect::{Reconciler, RunReport};
use rever_core::names::split_name_list;
use rever_core::{OverwriteMode, PrefixMarker, ReconcileConfig, Redacted};

/// Target system of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SystemName {
    /// BigQuery datasets, columns and Data Catalog table overviews.
    Bigquery,
    /// Athena tables through the Glue Data Catalog.
    Athena,
    /// Denodo VDP and the Denodo Data Catalog.
    Denodo,
}

impl SystemName {
    /// Catalog `service_name` of the system's assets.
    #[must_use]
    pub const fn service(self) -> &'static str {
        match self {
            Self::Bigquery => "bigquery",
            Self::Athena => "athena",
            Self::Denodo => "denodo",
        }
    }
}

/// Catalog API access.
#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Catalog API base URL.
    #[arg(long, env = "QDC_BASE_URL")]
    pub qdc_base_url: String,

    /// OAuth2 client ID for the catalog API.
    #[arg(long, env = "QDC_CLIENT_ID")]
    pub qdc_client_id: String,

    /// OAuth2 client secret for the catalog API.
    #[arg(long, env = "QDC_CLIENT_SECRET", hide_env_values = true)]
    pub qdc_client_secret: String,

    /// Only reconcile root assets created by this user.
    #[arg(long, env = "QDC_ASSET_CREATED_BY")]
    pub qdc_asset_created_by: Option<String>,
}

/// BigQuery settings.
#[derive(Debug, Args)]
pub struct BigQueryArgs {
    /// Service account key JSON; ambient credentials are used when unset.
    #[arg(long, env = bigquery::CREDENTIALS_ENV, hide_env_values = true)]
    pub google_credentials: Option<String>,

    /// Project for datasets whose catalog path names none.
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub google_project: Option<String>,
}

/// Athena (Glue) settings.
#[derive(Debug, Args)]
pub struct AthenaArgs {
    /// Account that owns the Glue Data Catalog.
    #[arg(long, env = "ATHENA_ACCOUNT_ID")]
    pub athena_account_id: Option<String>,

    /// Role to assume before calling Glue.
    #[arg(long, env = "AWS_IAM_ROLE_FOR_GLUE_TABLE")]
    pub glue_role_arn: Option<String>,

    /// AWS shared-config profile.
    #[arg(long, env = "PROFILE_NAME")]
    pub aws_profile: Option<String>,

    /// AWS region.
    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,
}

/// Denodo settings.
#[derive(Debug, Args)]
pub struct DenodoArgs {
    /// Denodo server host name.
    #[arg(long, env = "DENODO_HOST_NAME")]
    pub denodo_host_name: Option<String>,

    /// VDP ODBC port.
    #[arg(long, env = "DENODO_ODBC_PORT", default_value_t = 9996)]
    pub denodo_odbc_port: u16,

    /// Data Catalog REST API port.
    #[arg(long, env = "DENODO_REST_API_PORT", default_value_t = 9443)]
    pub denodo_rest_api_port: u16,

    /// Denodo user name.
    #[arg(long, env = "DENODO_CLIENT_ID")]
    pub denodo_client_id: Option<String>,

    /// Denodo password.
    #[arg(long, env = "DENODO_CLIENT_SECRET", hide_env_values = true)]
    pub denodo_client_secret: Option<String>,

    /// Database used for server-wide VDP queries.
    #[arg(long, env = "DENODO_DEFUALT_DB_NAME", default_value = "admin")]
    pub denodo_default_db_name: String,

    /// Whitespace-separated databases to reconcile; all when unset.
    #[arg(long, env = "DENODO_QUERY_TARGET_DB")]
    pub denodo_query_target_db: Option<String>,
}

/// Arguments for the run command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Target system.
    #[arg(long, env = "SYSTEM_NAME", value_enum)]
    pub system_name: SystemName,

    /// Overwrite policy for descriptions not written by rever.
    #[arg(long, env = "OVERWRITE_MODE", default_value = "IF_EMPTY")]
    pub overwrite_mode: OverwriteMode,

    /// Marker prepended to every description rever writes.
    #[arg(long, env = "PREFIX_FOR_UPDATE")]
    pub prefix_for_update: Option<String>,

    /// Catalog API access.
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// BigQuery settings.
    #[command(flatten)]
    pub bigquery: BigQueryArgs,

    /// Athena settings.
    #[command(flatten)]
    pub athena: AthenaArgs,

    /// Denodo settings.
    #[command(flatten)]
    pub denodo: DenodoArgs,
}

impl RunArgs {
    /// Builds the run configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is invalid.
    pub fn reconcile_config(&self) -> Result<ReconcileConfig> {
        let prefix = match self.prefix_for_update.as_deref() {
            None | Some("") => PrefixMarker::default(),
            Some(prefix) => PrefixMarker::new(prefix).context("invalid PREFIX_FOR_UPDATE")?,
        };
        let allow_list = match self.system_name {
            SystemName::Denodo => self.denodo.denodo_query_target_db.as_deref().map(split_name_list),
            SystemName::Bigquery | SystemName::Athena => None,
        };
        Ok(ReconcileConfig::new(self.system_name.service())
            .with_overwrite_mode(self.overwrite_mode)
            .with_prefix(prefix)
            .with_created_by(self.catalog.qdc_asset_created_by.clone())
            .with_database_allow_list(allow_list))
    }

    fn catalog_config(&self) -> CatalogClientConfig {
        CatalogClientConfig::new(
            &self.catalog.qdc_base_url,
            &self.catalog.qdc_client_id,
            &self.catalog.qdc_client_secret,
        )
    }
}

fn required<'a>(value: Option<&'a str>, flag: &str, env: &str) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .with_context(|| format!("--{flag} or {env} is required for this system"))
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if a connector cannot be set up or the run aborts.
pub async fn execute(args: RunArgs) -> Result<RunReport> {
    let config = args.reconcile_config()?;
    tracing::debug!(
        system = args.system_name.service(),
        overwrite_mode = %config.overwrite_mode,
        prefix = %config.prefix,
        "starting run"
    );
    let catalog: Arc<dyn CatalogSource> = Arc::new(
        CatalogClient::new(args.catalog_config()).context("failed to create catalog client")?,
    );
    let reconciler = Reconciler::new(catalog, config);

    let report = match args.system_name {
        SystemName::Bigquery => run_bigquery(reconciler, &args.bigquery).await?,
        SystemName::Athena => run_athena(reconciler, &args.athena).await?,
        SystemName::Denodo => run_denodo(reconciler, &args.denodo).await?,
    };
    tracing::info!(%report, "run finished");
    Ok(report)
}

async fn run_bigquery(reconciler: Reconciler, args: &BigQueryArgs) -> Result<RunReport> {
    let tokens = GcpTokenSource::new(args.google_credentials.as_deref())
        .await
        .context("failed to set up GCP credentials")?;
    let project = match args.google_project.as_deref() {
        Some(project) if !project.is_empty() => project.to_string(),
        _ => tokens
            .project_id()
            .await
            .context("no default project; set GOOGLE_CLOUD_PROJECT")?,
    };
    let client = BigQueryClient::new(BigQueryConfig::new(project), Box::new(tokens))
        .context("failed to create BigQuery client")?;

    let report = reconciler
        .with_adapter(Box::new(BigQueryAdapter::new(client)))
        .with_container_depth(bigquery::CONTAINER_DEPTH)
        .run()
        .await?;
    Ok(report)
}

async fn run_athena(reconciler: Reconciler, args: &AthenaArgs) -> Result<RunReport> {
    let account_id = required(
        args.athena_account_id.as_deref(),
        "athena-account-id",
        "ATHENA_ACCOUNT_ID",
    )?;
    let glue = AwsGlueClient::connect(GlueClientConfig {
        account_id: account_id.to_string(),
        region: args.aws_region.clone().filter(|r| !r.is_empty()),
        profile: args.aws_profile.clone().filter(|p| !p.is_empty()),
        role_arn: args.glue_role_arn.clone().filter(|r| !r.is_empty()),
    })
    .await;

    let report = reconciler
        .with_adapter(Box::new(GlueAdapter::new(glue)))
        .with_container_depth(glue::CONTAINER_DEPTH)
        .run()
        .await?;
    Ok(report)
}

async fn run_denodo(reconciler: Reconciler, args: &DenodoArgs) -> Result<RunReport> {
    let host = required(args.denodo_host_name.as_deref(), "denodo-host-name", "DENODO_HOST_NAME")?;
    let username = required(args.denodo_client_id.as_deref(), "denodo-client-id", "DENODO_CLIENT_ID")?;
    let password = required(
        args.denodo_client_secret.as_deref(),
        "denodo-client-secret",
        "DENODO_CLIENT_SECRET",
    )?;

    let vdp = Arc::new(SqlxVdpClient::new(VdpConnectConfig {
        host: host.to_string(),
        port: args.denodo_odbc_port,
        default_database: args.denodo_default_db_name.clone(),
        username: username.to_string(),
        password: Redacted::new(password.to_string()),
    }));
    let local = DenodoLocalClient::new(LocalClientConfig::new(
        host,
        args.denodo_rest_api_port,
        username,
        password,
    ))
    .context("failed to create Denodo Data Catalog client")?;

    let result = reconciler
        .with_adapter(Box::new(VdpAdapter::new(Arc::clone(&vdp))))
        .with_adapter(Box::new(LocalCatalogAdapter::new(local)))
        .with_container_depth(denodo::CONTAINER_DEPTH)
        .run()
        .await;
    vdp.close().await;
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cli, Commands};
    use clap::Parser;

    fn parse(extra: &[&str]) -> RunArgs {
        let mut argv = vec![
            "rever",
            "run",
            "--qdc-base-url",
            "https://catalog.example.com",
            "--qdc-client-id",
            "id",
            "--qdc-client-secret",
            "secret",
        ];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Run(args) => *args,
        }
    }

    #[test]
    fn defaults_follow_the_agent_conventions() {
        let args = parse(&["--system-name", "athena"]);
        let config = args.reconcile_config().unwrap();

        assert_eq!(config.service, "athena");
        assert_eq!(config.overwrite_mode, OverwriteMode::IfEmpty);
        assert_eq!(config.prefix, PrefixMarker::default());
        assert!(config.database_allow_list.is_none());
    }

    #[test]
    fn overwrite_mode_and_prefix_are_parsed() {
        let args = parse(&[
            "--system-name",
            "bigquery",
            "--overwrite-mode",
            "all",
            "--prefix-for-update",
            "[agent]",
            "--qdc-asset-created-by",
            "loader",
        ]);
        let config = args.reconcile_config().unwrap();

        assert_eq!(config.overwrite_mode, OverwriteMode::All);
        assert_eq!(config.prefix.as_str(), "[agent]");
        assert_eq!(config.created_by.as_deref(), Some("loader"));
    }

    #[test]
    fn empty_prefix_falls_back_to_the_default() {
        let args = parse(&["--system-name", "athena", "--prefix-for-update", ""]);
        assert_eq!(args.reconcile_config().unwrap().prefix, PrefixMarker::default());
    }

    #[test]
    fn denodo_target_databases_become_the_allow_list() {
        let args = parse(&[
            "--system-name",
            "denodo",
            "--denodo-query-target-db",
            "sales_db  hr",
        ]);
        let config = args.reconcile_config().unwrap();

        assert_eq!(
            config.database_allow_list,
            Some(vec!["sales_db".to_string(), "hr".to_string()])
        );
        assert!(!config.allows_database("finance"));
    }

    #[test]
    fn target_databases_are_ignored_for_other_systems() {
        let args = parse(&["--system-name", "athena", "--denodo-query-target-db", "sales_db"]);
        assert!(args.reconcile_config().unwrap().database_allow_list.is_none());
    }

    #[test]
    fn unknown_system_is_rejected() {
        let result = Cli::try_parse_from([
            "rever",
            "run",
            "--system-name",
            "snowflake",
            "--qdc-base-url",
            "u",
            "--qdc-client-id",
            "i",
            "--qdc-client-secret",
            "s",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_vendor_settings_are_reported_by_flag_and_env() {
        let err = required(None, "athena-account-id", "ATHENA_ACCOUNT_ID").unwrap_err();
        assert!(err.to_string().contains("ATHENA_ACCOUNT_ID"));
        assert!(required(Some(""), "x", "X").is_err());
        assert_eq!(required(Some("123"), "x", "X").unwrap(), "123");
    }
}
