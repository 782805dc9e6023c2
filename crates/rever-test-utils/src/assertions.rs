//! Custom assertion helpers for integration tests.

use rever_core::{EntityLevel, RunSummary};

use crate::catalog::RecordingCatalog;

/// Asserts the updated and skipped counts for one level.
///
/// # Panics
///
/// Panics if either count differs.
pub fn assert_level_counts(summary: &RunSummary, level: EntityLevel, updated: usize, skipped: usize) {
    let counts = summary.level(level);
    assert_eq!(
        (counts.updated, counts.skipped),
        (updated, skipped),
        "unexpected {level} counts (updated, skipped) in {summary}"
    );
}

/// Asserts the sizes of the ID batches sent to the catalog.
///
/// # Panics
///
/// Panics if the batch sizes differ.
pub fn assert_batch_sizes(catalog: &RecordingCatalog, expected: &[usize]) {
    let sizes: Vec<usize> = catalog.id_batches().iter().map(Vec::len).collect();
    assert_eq!(sizes, expected, "unexpected ID batch sizes");
}
