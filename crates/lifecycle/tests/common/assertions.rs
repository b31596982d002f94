//! Assertion helpers for lifecycle outcomes.

use docket_lifecycle::engine::{SaveOutcome, SkipReason};
use docket_lifecycle::types::Entity;

/// Asserts that a save persisted and returns the entity identifier.
///
/// # Panics
///
/// Panics if the save was skipped.
pub fn assert_persisted(outcome: &SaveOutcome) -> String {
    match outcome {
        SaveOutcome::Persisted { id, .. } => id.clone(),
        SaveOutcome::Skipped(reason) => panic!("expected a persisted save, got {:?}", reason),
    }
}

/// Asserts that a save was skipped for `reason`.
pub fn assert_skipped(outcome: &SaveOutcome, reason: SkipReason) {
    assert_eq!(
        outcome,
        &SaveOutcome::Skipped(reason),
        "expected save to be skipped as {:?}",
        reason
    );
}

/// Asserts that an entity carries a validation error at each of `paths`, in order.
pub fn assert_error_paths<T: Entity>(entity: &T, paths: &[&str]) {
    let actual: Vec<_> = entity.errors().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(actual, paths, "validation error paths mismatch");
}
