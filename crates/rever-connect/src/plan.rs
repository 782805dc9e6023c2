//! Per-entity write planning shared by every adapter.
//!
//! An adapter reads the current native description, calls [`plan_update`]
//! and only talks to the target again when the plan is [`Plan::Write`].

use rever_catalog::CatalogAsset;
use rever_core::{
    DescriptionFormat, OverwriteMode, PrefixMarker, SkipReason, TargetDescription, UpdateOutcome,
    render_description, should_update,
};

use crate::error::TargetError;

/// The run-wide inputs of the decision, plus the adapter's rendering format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePolicy {
    /// Overwrite mode for the run.
    pub mode: OverwriteMode,
    /// Marker identifying agent-written text.
    pub prefix: PrefixMarker,
    /// How catalog text is rendered before marking.
    pub format: DescriptionFormat,
}

impl UpdatePolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(mode: OverwriteMode, prefix: PrefixMarker, format: DescriptionFormat) -> Self {
        Self {
            mode,
            prefix,
            format,
        }
    }

    /// Renders the text that would be written for `asset`.
    #[must_use]
    pub fn render(&self, asset: &CatalogAsset) -> String {
        render_description(
            &self.prefix,
            self.format,
            &asset.logical_name,
            &asset.description,
        )
    }
}

/// What to do with one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Write this text.
    Write(String),
    /// Leave the entity alone.
    Skip(SkipReason),
}

/// Decides whether `asset` should be written over `current`.
///
/// A rendered text equal to the current one is reported as
/// [`SkipReason::Unchanged`], so a rerun issues no calls.
#[must_use]
pub fn plan_update(
    policy: &UpdatePolicy,
    current: TargetDescription<'_>,
    asset: &CatalogAsset,
) -> Plan {
    if asset.description.is_empty() {
        return Plan::Skip(SkipReason::EmptyCatalogDescription);
    }
    if !should_update(policy.mode, &policy.prefix, current, &asset.description) {
        tracing::debug!(name = %asset.physical_name, "target description is user-owned");
        return Plan::Skip(SkipReason::Preserved);
    }
    let rendered = policy.render(asset);
    if matches!(current, TargetDescription::Present(text) if text == rendered) {
        return Plan::Skip(SkipReason::Unchanged);
    }
    Plan::Write(rendered)
}

/// Converts a target error into an outcome.
///
/// Not-found and permission-denied errors are skips; everything else fails.
#[must_use]
pub fn outcome_from_error(error: &TargetError, entity: &str) -> UpdateOutcome {
    match SkipReason::from_error_kind(error.kind) {
        Some(reason) => {
            tracing::warn!(
                system = error.system,
                entity,
                kind = %error.kind,
                error = %error.message,
                "skipping entity"
            );
            UpdateOutcome::Skipped(reason)
        }
        None => UpdateOutcome::Failed {
            kind: error.kind,
            message: error.to_string(),
        },
    }
}

/// Collapses a write result into an outcome.
#[must_use]
pub fn outcome_of(result: Result<(), TargetError>, entity: &str) -> UpdateOutcome {
    match result {
        Ok(()) => UpdateOutcome::Updated,
        Err(error) => outcome_from_error(&error, entity),
    }
}
