//! The update-decision policy.
//!
//! [`should_update`] is a total, pure function: no I/O, no hidden state. Rule
//! order matters and is fixed:
//!
//! 1. empty catalog description: never write
//! 2. [`OverwriteMode::All`]: write
//! 3. target absent: write
//! 4. target present but empty: write
//! 5. target starts with the prefix marker: write
//! 6. otherwise the text is user-owned: keep it

use crate::config::OverwriteMode;
use crate::marker::PrefixMarker;

/// The current description of a target entity.
///
/// Systems without a null state construct [`TargetDescription::Present`] for
/// both unset and empty fields; the engine treats the two identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetDescription<'a> {
    /// The field is unset.
    Absent,
    /// The field holds a value, possibly empty.
    Present(&'a str),
}

impl<'a> TargetDescription<'a> {
    /// Builds the state from an optional native field.
    #[must_use]
    pub fn from_option(description: Option<&'a str>) -> Self {
        description.map_or(Self::Absent, Self::Present)
    }
}

/// Decides whether the catalog description should overwrite the target's.
#[must_use]
pub fn should_update(
    mode: OverwriteMode,
    prefix: &PrefixMarker,
    target: TargetDescription<'_>,
    catalog_description: &str,
) -> bool {
    if catalog_description.is_empty() {
        return false;
    }
    if mode == OverwriteMode::All {
        return true;
    }
    match target {
        TargetDescription::Absent | TargetDescription::Present("") => true,
        TargetDescription::Present(current) => prefix.is_marked(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn marker() -> PrefixMarker {
        PrefixMarker::default()
    }

    #[test]
    fn user_text_is_preserved() {
        assert!(!should_update(
            OverwriteMode::IfEmpty,
            &marker(),
            TargetDescription::Present("user text"),
            "catalog text",
        ));
    }

    #[test]
    fn marked_text_is_refreshed() {
        assert!(should_update(
            OverwriteMode::IfEmpty,
            &marker(),
            TargetDescription::Present("【QDIC】old text"),
            "new text",
        ));
    }

    #[test]
    fn empty_and_absent_targets_update() {
        for target in [TargetDescription::Absent, TargetDescription::Present("")] {
            assert!(should_update(OverwriteMode::IfEmpty, &marker(), target, "text"));
        }
    }

    #[test]
    fn from_option_distinguishes_states() {
        assert_eq!(TargetDescription::from_option(None), TargetDescription::Absent);
        assert_eq!(TargetDescription::from_option(Some("")), TargetDescription::Present(""));
    }

    fn any_mode() -> impl Strategy<Value = OverwriteMode> {
        prop_oneof![Just(OverwriteMode::IfEmpty), Just(OverwriteMode::All)]
    }

    proptest! {
        #[test]
        fn empty_catalog_never_writes(
            mode in any_mode(),
            prefix in ".{1,6}",
            current in ".*",
            has_value in any::<bool>(),
        ) {
            let prefix = PrefixMarker::new(prefix).unwrap();
            let target = TargetDescription::from_option(has_value.then_some(current.as_str()));
            prop_assert!(!should_update(mode, &prefix, target, ""));
        }

        #[test]
        fn overwrite_all_dominates(current in ".*", catalog in ".+") {
            let target = TargetDescription::Present(&current);
            prop_assert!(should_update(OverwriteMode::All, &marker(), target, &catalog));
        }

        #[test]
        fn absent_target_always_updates(catalog in ".+") {
            prop_assert!(should_update(
                OverwriteMode::IfEmpty,
                &marker(),
                TargetDescription::Absent,
                &catalog,
            ));
        }

        #[test]
        fn decision_is_deterministic(
            mode in any_mode(),
            current in ".*",
            has_value in any::<bool>(),
            catalog in ".*",
        ) {
            let target = TargetDescription::from_option(has_value.then_some(current.as_str()));
            let first = should_update(mode, &marker(), target, &catalog);
            let second = should_update(mode, &marker(), target, &catalog);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn rerun_matches_by_marker(catalog in ".+") {
            let written = marker().apply(&catalog);
            prop_assert!(should_update(
                OverwriteMode::IfEmpty,
                &marker(),
                TargetDescription::Present(&written),
                &catalog,
            ));
            prop_assert_eq!(marker().apply(&written), written);
        }
    }
}
