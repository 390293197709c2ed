//! Tests for FilterSet

use serde_json::json;

use jot_protocol::Entry;

use crate::filter::{filter_fn, FilterSet};

// =============================================================================
// Identity tests
// =============================================================================

#[test]
fn test_empty_sets_share_identity_zero() {
    assert_eq!(FilterSet::new().id(), 0);
    assert_eq!(FilterSet::default().id(), 0);
    assert_eq!(FilterSet::from_filters(Vec::new()).id(), 0);
    assert_eq!(FilterSet::empty().id(), 0);
}

#[test]
fn test_non_empty_sets_get_distinct_ids() {
    let a = FilterSet::from_filters(vec![filter_fn(|e| e)]);
    let b = FilterSet::from_filters(vec![filter_fn(|e| e)]);

    assert_ne!(a.id(), 0);
    assert_ne!(b.id(), 0);
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_clone_keeps_identity() {
    let set = FilterSet::from_filters(vec![filter_fn(|e| e)]);
    assert_eq!(set.clone().id(), set.id());
}

// =============================================================================
// Apply tests
// =============================================================================

#[test]
fn test_apply_runs_chain_in_order() {
    let first = filter_fn(|mut e: Entry| {
        e.insert("trace", "a");
        e
    });
    let second = filter_fn(|mut e: Entry| {
        let prev = e
            .get("trace")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        e.insert("trace", format!("{prev}b"));
        e
    });

    let set = FilterSet::from_filters(vec![first, second]);
    let out = set.apply(&Entry::new());
    assert_eq!(out.get("trace"), Some(&json!("ab")));
}

#[test]
fn test_apply_leaves_input_untouched() {
    let drop_secret = filter_fn(|mut e: Entry| {
        e.remove("secret");
        e
    });
    let set = FilterSet::from_filters(vec![drop_secret]);

    let mut entry = Entry::new();
    entry.insert("secret", 42);

    let out = set.apply(&entry);
    assert!(!out.contains_key("secret"));
    assert_eq!(entry.get("secret"), Some(&json!(42)));
}

#[test]
fn test_empty_set_applies_nothing() {
    let mut entry = Entry::new();
    entry.insert("x", 1);

    let out = FilterSet::new().apply(&entry);
    assert_eq!(out, entry);
}
