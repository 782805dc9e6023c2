//! Per-entity outcomes and the run summary.

use std::fmt;

use serde::Serialize;

use crate::error::ErrorKind;

/// The level of the hierarchy an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLevel {
    /// Database, dataset or schema.
    Schema,
    /// Table or view.
    Table,
    /// Column or field.
    Column,
}

impl EntityLevel {
    /// Returns the lowercase name of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Table => "table",
            Self::Column => "column",
        }
    }
}

impl fmt::Display for EntityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an entity was not written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The catalog marks the asset as lost.
    Lost,
    /// The catalog description is empty.
    EmptyCatalogDescription,
    /// The target cannot address the entity by this name.
    UnaddressableName,
    /// The database is not in the configured allow-list.
    NotAllowed,
    /// The decision policy preserved the current text.
    Preserved,
    /// The rendered description equals the current one.
    Unchanged,
    /// The entity does not exist in the target system.
    NotFound,
    /// The configured identity may not update the entity.
    PermissionDenied,
    /// The target does not support updating this entity.
    Unsupported,
}

impl SkipReason {
    /// Maps a skippable error kind to its skip reason.
    #[must_use]
    pub const fn from_error_kind(kind: ErrorKind) -> Option<Self> {
        match kind {
            ErrorKind::NotFound => Some(Self::NotFound),
            ErrorKind::PermissionDenied => Some(Self::PermissionDenied),
            ErrorKind::Malformed | ErrorKind::Other => None,
        }
    }
}

/// Result of reconciling one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A write was issued and accepted.
    Updated,
    /// No write was issued.
    Skipped(SkipReason),
    /// The write or lookup failed with a fatal error.
    Failed {
        /// Classification of the failure.
        kind: ErrorKind,
        /// Description of the failure.
        message: String,
    },
}

impl UpdateOutcome {
    /// Returns true if this outcome must abort the run.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Counters for one entity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    /// Entities written.
    pub updated: usize,
    /// Entities skipped for any reason.
    pub skipped: usize,
    /// Entities skipped because the target does not know them.
    pub not_found: usize,
    /// Entities skipped because of missing permissions.
    pub permission_denied: usize,
}

/// Aggregated outcome counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Schema-level counts.
    pub schemas: LevelCounts,
    /// Table-level counts.
    pub tables: LevelCounts,
    /// Column-level counts.
    pub columns: LevelCounts,
}

impl RunSummary {
    /// Records a non-failed outcome.
    ///
    /// Failed outcomes abort the run and are reported through the error
    /// path; they are ignored here.
    pub fn record(&mut self, level: EntityLevel, outcome: &UpdateOutcome) {
        let counts = self.level_mut(level);
        match outcome {
            UpdateOutcome::Updated => counts.updated += 1,
            UpdateOutcome::Skipped(reason) => {
                counts.skipped += 1;
                match reason {
                    SkipReason::NotFound => counts.not_found += 1,
                    SkipReason::PermissionDenied => counts.permission_denied += 1,
                    _ => {}
                }
            }
            UpdateOutcome::Failed { .. } => {}
        }
    }

    /// Returns the counts for `level`.
    #[must_use]
    pub const fn level(&self, level: EntityLevel) -> &LevelCounts {
        match level {
            EntityLevel::Schema => &self.schemas,
            EntityLevel::Table => &self.tables,
            EntityLevel::Column => &self.columns,
        }
    }

    fn level_mut(&mut self, level: EntityLevel) -> &mut LevelCounts {
        match level {
            EntityLevel::Schema => &mut self.schemas,
            EntityLevel::Table => &mut self.tables,
            EntityLevel::Column => &mut self.columns,
        }
    }

    /// Total entities written.
    #[must_use]
    pub const fn total_updated(&self) -> usize {
        self.schemas.updated + self.tables.updated + self.columns.updated
    }

    /// Total entities skipped.
    #[must_use]
    pub const fn total_skipped(&self) -> usize {
        self.schemas.skipped + self.tables.skipped + self.columns.skipped
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "schemas {}/{} tables {}/{} columns {}/{} (updated/skipped)",
            self.schemas.updated,
            self.schemas.skipped,
            self.tables.updated,
            self.tables.skipped,
            self.columns.updated,
            self.columns.skipped,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_by_level_and_reason() {
        let mut summary = RunSummary::default();
        summary.record(EntityLevel::Schema, &UpdateOutcome::Updated);
        summary.record(EntityLevel::Table, &UpdateOutcome::Skipped(SkipReason::NotFound));
        summary.record(
            EntityLevel::Table,
            &UpdateOutcome::Skipped(SkipReason::PermissionDenied),
        );
        summary.record(EntityLevel::Column, &UpdateOutcome::Skipped(SkipReason::Unchanged));

        assert_eq!(summary.schemas.updated, 1);
        assert_eq!(summary.tables.skipped, 2);
        assert_eq!(summary.tables.not_found, 1);
        assert_eq!(summary.tables.permission_denied, 1);
        assert_eq!(summary.total_updated(), 1);
        assert_eq!(summary.total_skipped(), 3);
    }

    #[test]
    fn skip_reason_from_kind() {
        assert_eq!(
            SkipReason::from_error_kind(ErrorKind::NotFound),
            Some(SkipReason::NotFound)
        );
        assert_eq!(SkipReason::from_error_kind(ErrorKind::Malformed), None);
    }

    #[test]
    fn failed_outcome_is_detected() {
        let failed = UpdateOutcome::Failed {
            kind: ErrorKind::Other,
            message: "boom".into(),
        };
        assert!(failed.is_failed());
        assert!(!UpdateOutcome::Updated.is_failed());
    }
}
