//! Run-wide reconciliation configuration.
//!
//! A [`ReconcileConfig`] is built once by the binary and passed into the driver.
//! Nothing below the binary reads the process environment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::marker::PrefixMarker;

/// Whether non-agent-marked, non-empty target descriptions may be overwritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverwriteMode {
    /// Only write where the target is empty or was written by this agent.
    #[default]
    IfEmpty,
    /// The catalog is authoritative; always write a non-empty description.
    All,
}

impl OverwriteMode {
    /// Returns the configuration string for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IfEmpty => "IF_EMPTY",
            Self::All => "ALL",
        }
    }
}

impl fmt::Display for OverwriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverwriteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "IF_EMPTY" | "IFEMPTY" => Ok(Self::IfEmpty),
            "ALL" => Ok(Self::All),
            other => Err(Error::configuration(format!(
                "unknown overwrite mode '{other}', expected ALL or IF_EMPTY"
            ))),
        }
    }
}

/// Explicit configuration for a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Overwrite policy, fixed for the whole run.
    pub overwrite_mode: OverwriteMode,
    /// Marker prepended to every description this agent writes.
    pub prefix: PrefixMarker,
    /// Catalog `service_name` that root assets must carry.
    pub service: String,
    /// Optional catalog `created_by` filter for root assets.
    pub created_by: Option<String>,
    /// Optional database allow-list; `None` reconciles every database.
    pub database_allow_list: Option<Vec<String>>,
}

impl ReconcileConfig {
    /// Creates a configuration for `service` with default mode and prefix.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            overwrite_mode: OverwriteMode::default(),
            prefix: PrefixMarker::default(),
            service: service.into(),
            created_by: None,
            database_allow_list: None,
        }
    }

    /// Sets the overwrite mode.
    #[must_use]
    pub fn with_overwrite_mode(mut self, mode: OverwriteMode) -> Self {
        self.overwrite_mode = mode;
        self
    }

    /// Sets the prefix marker.
    #[must_use]
    pub fn with_prefix(mut self, prefix: PrefixMarker) -> Self {
        self.prefix = prefix;
        self
    }

    /// Sets the creator filter. Empty strings disable the filter.
    #[must_use]
    pub fn with_created_by(mut self, created_by: Option<String>) -> Self {
        self.created_by = created_by.filter(|c| !c.is_empty());
        self
    }

    /// Sets the database allow-list. An empty list disables the filter.
    #[must_use]
    pub fn with_database_allow_list(mut self, list: Option<Vec<String>>) -> Self {
        self.database_allow_list = list.filter(|l| !l.is_empty());
        self
    }

    /// Returns true if `database` passes the allow-list.
    #[must_use]
    pub fn allows_database(&self, database: &str) -> bool {
        self.database_allow_list
            .as_ref()
            .is_none_or(|list| list.iter().any(|d| d == database))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the service filter is empty.
    pub fn validate(&self) -> Result<()> {
        if self.service.trim().is_empty() {
            return Err(Error::configuration("service name must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_mode_parses_case_insensitively() {
        assert_eq!("all".parse::<OverwriteMode>().unwrap(), OverwriteMode::All);
        assert_eq!("If_Empty".parse::<OverwriteMode>().unwrap(), OverwriteMode::IfEmpty);
        assert_eq!("".parse::<OverwriteMode>().unwrap(), OverwriteMode::IfEmpty);
        assert!("sometimes".parse::<OverwriteMode>().is_err());
    }

    #[test]
    fn overwrite_mode_serde_uses_config_strings() {
        let json = serde_json::to_string(&OverwriteMode::IfEmpty).unwrap();
        assert_eq!(json, "\"IF_EMPTY\"");
    }

    #[test]
    fn empty_filters_are_disabled() {
        let config = ReconcileConfig::new("denodo")
            .with_created_by(Some(String::new()))
            .with_database_allow_list(Some(vec![]));
        assert!(config.created_by.is_none());
        assert!(config.database_allow_list.is_none());
        assert!(config.allows_database("anything"));
    }

    #[test]
    fn allow_list_restricts_databases() {
        let config = ReconcileConfig::new("denodo")
            .with_database_allow_list(Some(vec!["sales_db".into(), "hr".into()]));
        assert!(config.allows_database("sales_db"));
        assert!(!config.allows_database("finance"));
    }

    #[test]
    fn validate_rejects_blank_service() {
        assert!(ReconcileConfig::new("  ").validate().is_err());
        assert!(ReconcileConfig::new("bigquery").validate().is_ok());
    }
}
