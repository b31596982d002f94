//! Save pipeline integration tests.
//!
//! These tests exercise `LifecycleEngine::save` against the memory store:
//! identifier assignment, timestamps, validation, hooks, guards and auditing.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use docket_lifecycle::engine::{SaveOutcome, SkipReason};
use docket_lifecycle::error::{BackendError, ResourceError, StorageError};
use docket_lifecycle::providers::StaticUser;
use docket_lifecycle::types::{Entity, QueryOptions};

use common::*;

// ============================================================================
// Insert / Update
// ============================================================================

#[tokio::test]
async fn test_save_assigns_id_and_timestamps() {
    let ctx = TestContext::new();
    let mut widget = Widget::new("gear");

    let outcome = ctx.engine.save(&mut widget).await.unwrap();
    let id = assert_persisted(&outcome);

    assert_eq!(widget.id(), Some(id.as_str()));
    assert!(widget.meta.date_created().is_some());
    assert_eq!(widget.meta.date_created(), widget.meta.date_updated());
    assert!(widget.errors().is_empty());
    assert_eq!(ctx.store.document_count("Widget"), 1);
}

#[tokio::test]
async fn test_second_save_updates_in_place() {
    let ctx = TestContext::new();
    let mut widget = Widget::new("gear");
    ctx.engine.save(&mut widget).await.unwrap();
    let id = widget.id().unwrap().to_string();
    let created = widget.meta.date_created();

    widget.name = "cog".to_string();
    let outcome = ctx.engine.save(&mut widget).await.unwrap();

    assert_eq!(outcome.id(), Some(id.as_str()));
    assert_eq!(widget.meta.date_created(), created);
    assert!(widget.meta.date_updated() >= created);
    assert_eq!(ctx.store.document_count("Widget"), 1);

    let stored: Widget = ctx.engine.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.name, "cog");
}

#[tokio::test]
async fn test_round_trip_by_id() {
    let ctx = TestContext::new();
    let mut order = Order::new("Ada", "acme")
        .with_line("GEAR-1", 3)
        .with_shipping(Address::new("1 Main St", "Springfield", "12345"));
    ctx.engine.save(&mut order).await.unwrap();

    let loaded: Order = ctx
        .engine
        .get_by_id(order.id().unwrap())
        .await
        .unwrap()
        .expect("saved order should be retrievable");
    assert_eq!(loaded, order);
}

// ============================================================================
// Validation
// ============================================================================

/// Order requires a customer name; an invalid order is not written.
#[tokio::test]
async fn test_order_validation_scenario() {
    let ctx = TestContext::with(|registry| {
        registry.enable_soft_delete::<Order>();
    });
    let mut order = Order::new("", "acme");

    let outcome = ctx.engine.save(&mut order).await.unwrap();
    assert_skipped(&outcome, SkipReason::Invalid);
    assert!(!order.errors().is_empty());
    assert!(order.id().is_none());
    assert_eq!(ctx.store.document_count("Order"), 0);

    order.customer_name = "X".to_string();
    let outcome = ctx.engine.save(&mut order).await.unwrap();
    assert!(outcome.is_persisted());
    assert!(order.errors().is_empty());
    assert!(order.id().is_some());
}

#[tokio::test]
async fn test_nested_validation_paths() {
    let ctx = TestContext::new();
    let mut order = Order::new("Ada", "acme")
        .with_line("GEAR-1", 2)
        .with_line("bad sku", 0)
        .with_shipping(Address::new("", "Springfield", "1234"));
    order.status = "lost".to_string();

    let outcome = ctx.engine.save(&mut order).await.unwrap();
    assert_skipped(&outcome, SkipReason::Invalid);
    assert_error_paths(
        &order,
        &[
            "status",
            "lines[1].sku",
            "lines[1].quantity",
            "shipping.street",
            "shipping.postcode",
        ],
    );
}

#[tokio::test]
async fn test_invalid_save_leaves_timestamps_untouched() {
    let ctx = TestContext::new();
    let mut widget = Widget::new("gear");
    ctx.engine.save(&mut widget).await.unwrap();
    let updated = widget.meta.date_updated();

    widget.size = 5000;
    let outcome = ctx.engine.save(&mut widget).await.unwrap();

    assert_skipped(&outcome, SkipReason::Invalid);
    assert_eq!(widget.meta.date_updated(), updated);
    assert_eq!(widget.errors()[0].path, "size");
    assert_eq!(widget.errors()[0].rule, "range");
    assert_eq!(ctx.writes(), 1);
}

// ============================================================================
// Hooks
// ============================================================================

#[tokio::test]
async fn test_rejecting_hook_skips_write() {
    let ctx = TestContext::with(|registry| {
        registry.add_before_save_behavior::<Widget>(|w| w.name != "forbidden");
    });
    let mut widget = Widget::new("forbidden");

    let outcome = ctx.engine.save(&mut widget).await.unwrap();

    assert_skipped(&outcome, SkipReason::Rejected);
    assert!(widget.meta.date_created().is_none());
    assert!(widget.meta.date_updated().is_none());
    assert!(widget.id().is_none());
    assert_eq!(ctx.writes(), 0);
}

#[tokio::test]
async fn test_every_before_hook_runs_after_rejection() {
    let calls = Arc::new(AtomicUsize::new(0));
    let first = Arc::clone(&calls);
    let second = Arc::clone(&calls);
    let ctx = TestContext::with(move |registry| {
        registry
            .add_before_save_behavior::<Widget>(move |_| {
                first.fetch_add(1, Ordering::SeqCst);
                false
            })
            .add_before_save_behavior::<Widget>(move |_| {
                second.fetch_add(1, Ordering::SeqCst);
                true
            });
    });

    let outcome = ctx.engine.save(&mut Widget::new("gear")).await.unwrap();

    assert_skipped(&outcome, SkipReason::Rejected);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_before_hook_mutation_is_persisted() {
    let ctx = TestContext::with(|registry| {
        registry.add_before_save_behavior::<Widget>(|w| {
            w.name = w.name.trim().to_lowercase();
            true
        });
    });
    let mut widget = Widget::new("  GEAR ");

    ctx.engine.save(&mut widget).await.unwrap();

    let stored: Widget = ctx
        .engine
        .get_by_id(widget.id().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "gear");
}

#[tokio::test]
async fn test_after_hook_sees_assigned_id() {
    let seen = Arc::new(parking_lot::Mutex::new(None));
    let sink = Arc::clone(&seen);
    let ctx = TestContext::with(move |registry| {
        registry.add_after_save_behavior::<Widget>(move |w| {
            *sink.lock() = w.id().map(str::to_string);
        });
    });
    let mut widget = Widget::new("gear");

    ctx.engine.save(&mut widget).await.unwrap();

    assert_eq!(seen.lock().as_deref(), widget.id());
}

#[tokio::test]
async fn test_hooks_only_apply_to_their_type() {
    let ctx = TestContext::with(|registry| {
        registry.add_before_save_behavior::<Widget>(|_| false);
    });

    let outcome = ctx.engine.save(&mut Note::new("hello", "acme")).await.unwrap();
    assert!(outcome.is_persisted());
}

// ============================================================================
// Guards
// ============================================================================

#[tokio::test]
async fn test_soft_deleted_entity_is_not_saved() {
    let ctx = TestContext::with(|registry| {
        registry.enable_soft_delete::<Widget>();
    });
    let mut widget = Widget::new("gear");
    ctx.engine.save(&mut widget).await.unwrap();
    ctx.engine.delete(&mut widget).await.unwrap();

    let before = widget.clone();
    let writes = ctx.writes();
    widget.name = "changed".to_string();
    let outcome = ctx.engine.save(&mut widget).await.unwrap();

    assert_skipped(&outcome, SkipReason::Deleted);
    assert_eq!(widget.meta, before.meta);
    assert_eq!(ctx.writes(), writes);

    let stored: Widget = ctx
        .engine
        .get_by_id(widget.id().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "gear");
}

#[tokio::test]
async fn test_version_snapshot_is_not_saved() {
    let ctx = TestContext::with(|registry| {
        registry.enable_versioning::<Widget>();
    });
    let mut widget = Widget::new("gear");
    ctx.engine.save(&mut widget).await.unwrap();

    let mut version = ctx.engine.get_versions(&widget).await.unwrap().remove(0);
    let before = version.clone();
    let writes = ctx.writes();
    version.name = "tampered".to_string();

    let outcome = ctx.engine.save(&mut version).await.unwrap();

    assert_skipped(&outcome, SkipReason::Version);
    assert_eq!(version.meta, before.meta);
    assert_eq!(ctx.writes(), writes);
}

#[tokio::test]
async fn test_deleted_flag_without_soft_delete_is_saved() {
    let ctx = TestContext::new();
    let mut widget = Widget::new("gear");
    ctx.engine.save(&mut widget).await.unwrap();

    // A document flagged deleted by another writer is only guarded when
    // soft delete is enabled for the type.
    let mut stored: Widget = serde_json::from_value(serde_json::json!({
        "id": widget.id().unwrap(),
        "isDeleted": true,
        "name": "gear",
    }))
    .unwrap();
    let outcome = ctx.engine.save(&mut stored).await.unwrap();
    assert!(outcome.is_persisted());
}

// ============================================================================
// Auditing
// ============================================================================

#[tokio::test]
async fn test_user_auditing_records_current_user() {
    let ctx = TestContext::with(|registry| {
        registry
            .enable_user_auditing::<Widget>()
            .set_user_provider(StaticUser("ada".to_string()));
    });
    let mut widget = Widget::new("gear");

    ctx.engine.save(&mut widget).await.unwrap();

    assert_eq!(widget.meta.updated_by(), Some("ada"));
    let stored = ctx.store.documents("Widget");
    assert_eq!(stored[0]["updatedBy"], "ada");
}

#[tokio::test]
async fn test_auditing_disabled_ignores_provider() {
    let ctx = TestContext::with(|registry| {
        registry.set_user_provider(|| Some("ada".to_string()));
    });
    let mut widget = Widget::new("gear");

    ctx.engine.save(&mut widget).await.unwrap();

    assert!(widget.meta.updated_by().is_none());
}

#[tokio::test]
async fn test_auditing_without_user_leaves_field_unset() {
    let ctx = TestContext::with(|registry| {
        registry
            .enable_user_auditing::<Widget>()
            .set_user_provider(|| None::<String>);
    });
    let mut widget = Widget::new("gear");

    let outcome = ctx.engine.save(&mut widget).await.unwrap();

    assert!(outcome.is_persisted());
    assert!(widget.meta.updated_by().is_none());
}

// ============================================================================
// Store failures and events
// ============================================================================

#[tokio::test]
async fn test_store_write_failure_propagates() {
    let (engine, store) = failing_engine(|_| {});
    store.fail_writes();
    let mut widget = Widget::new("gear");

    let result = engine.save(&mut widget).await;

    assert!(matches!(
        result,
        Err(StorageError::Backend(BackendError::Unavailable { .. }))
    ));
    assert!(widget.id().is_none());
}

#[tokio::test]
async fn test_missing_id_from_store_is_an_error() {
    let (engine, store) = failing_engine(|_| {});
    store.strip_ids();

    let result = engine.save(&mut Widget::new("gear")).await;

    assert!(matches!(
        result,
        Err(StorageError::Resource(ResourceError::MissingId { .. }))
    ));
}

#[tokio::test]
async fn test_save_emits_event() {
    let ctx = TestContext::new();
    let mut widget = Widget::new("gear");
    ctx.engine.save(&mut widget).await.unwrap();

    let saves = ctx.events_starting_with("save Widget");
    assert_eq!(saves.len(), 1);
    assert!(saves[0].contains(widget.id().unwrap()));
}

#[tokio::test]
async fn test_skipped_save_emits_no_event() {
    let ctx = TestContext::new();
    ctx.engine.save(&mut Widget::new("")).await.unwrap();
    assert!(ctx.events_starting_with("save").is_empty());
}

#[tokio::test]
async fn test_persisted_outcome_without_versioning() {
    let ctx = TestContext::new();
    let mut widget = Widget::new("gear");
    let outcome = ctx.engine.save(&mut widget).await.unwrap();

    assert_eq!(
        outcome,
        SaveOutcome::Persisted {
            id: widget.id().unwrap().to_string(),
            version_id: None,
        }
    );
    let all = ctx
        .engine
        .all_with::<Widget>(QueryOptions::new().with_versions())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}
