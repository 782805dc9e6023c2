//! The prefix marker that identifies agent-written descriptions.
//!
//! Idempotency across runs rests entirely on this marker: text starting with
//! it was written by a previous run and may be refreshed, anything else
//! belongs to a human and is preserved under [`OverwriteMode::IfEmpty`].
//!
//! [`OverwriteMode::IfEmpty`]: crate::config::OverwriteMode::IfEmpty

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default marker prepended to agent-written descriptions.
pub const DEFAULT_PREFIX: &str = "【QDIC】";

/// A non-empty marker string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrefixMarker(String);

impl PrefixMarker {
    /// Creates a marker.
    ///
    /// # Errors
    ///
    /// Returns an error if `prefix` is empty, since an empty marker would make
    /// every description look agent-written.
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(Error::configuration("prefix marker must not be empty"));
        }
        Ok(Self(prefix))
    }

    /// Returns the marker text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if `text` was written by this agent.
    #[must_use]
    pub fn is_marked(&self, text: &str) -> bool {
        text.starts_with(&self.0)
    }

    /// Prepends the marker unless `text` already carries it.
    ///
    /// `apply(apply(x)) == apply(x)`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        if self.is_marked(text) {
            text.to_string()
        } else {
            format!("{}{text}", self.0)
        }
    }
}

impl Default for PrefixMarker {
    fn default() -> Self {
        Self(DEFAULT_PREFIX.to_string())
    }
}

impl fmt::Display for PrefixMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PrefixMarker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// How a catalog entity is turned into description text before marking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DescriptionFormat {
    /// The catalog description as-is.
    #[default]
    Plain,
    /// Logical name and description under bracketed labels (Denodo).
    LabeledLogicalName,
}

/// Renders the final description to write: formatted, then marked.
///
/// # Example
///
/// ```rust
/// use rever_core::marker::{render_description, DescriptionFormat, PrefixMarker};
///
/// let text = render_description(
///     &PrefixMarker::default(),
///     DescriptionFormat::Plain,
///     "",
///     "Sales data",
/// );
/// assert_eq!(text, "【QDIC】Sales data");
/// ```
#[must_use]
pub fn render_description(
    prefix: &PrefixMarker,
    format: DescriptionFormat,
    logical_name: &str,
    description: &str,
) -> String {
    match format {
        DescriptionFormat::Plain => prefix.apply(description),
        DescriptionFormat::LabeledLogicalName => {
            prefix.apply(&format!("【項目名称】{logical_name}\n【説明】{description}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_prefix_is_rejected() {
        assert!(PrefixMarker::new("").is_err());
        assert!("".parse::<PrefixMarker>().is_err());
    }

    #[test]
    fn apply_never_double_prefixes() {
        let marker = PrefixMarker::default();
        let once = marker.apply("Sales data");
        assert_eq!(once, "【QDIC】Sales data");
        assert_eq!(marker.apply(&once), once);
    }

    #[test]
    fn labeled_format_includes_logical_name() {
        let text = render_description(
            &PrefixMarker::default(),
            DescriptionFormat::LabeledLogicalName,
            "売上",
            "Sales data",
        );
        assert_eq!(text, "【QDIC】【項目名称】売上\n【説明】Sales data");
    }

    proptest! {
        #[test]
        fn apply_is_idempotent(prefix in "[^\\s]{1,8}", text in ".*") {
            let marker = PrefixMarker::new(prefix).unwrap();
            let once = marker.apply(&text);
            prop_assert!(marker.is_marked(&once));
            prop_assert_eq!(marker.apply(&once), once);
        }
    }
}
