//! End-to-end scenarios straight out of the spec's testable-properties
//! section: short IDs renumbering on write, reopening returning a document
//! to its creation-order slot rather than the end, case-insensitive search,
//! and the default-partition-before-non-default ordering rule.

use facetdb::core::config::{Config, Dimension};
use facetdb::core::types::{DimensionMap, UpdateRequest};
use facetdb::core::store::Store;

fn todo_config(path: &std::path::Path) -> Config {
    Config::new(path)
        .with_dimension(
            Dimension::enumerated("status", vec!["pending".into(), "completed".into()])
                .with_default("pending")
                .with_prefix("completed", 'c'),
        )
        .with_dimension(
            Dimension::enumerated("priority", vec!["normal".into(), "high".into()])
                .with_default("normal")
                .with_prefix("high", 'h'),
        )
        .with_dimension(Dimension::hierarchical("parent_id"))
}

fn simple_ids(store: &Store, query: &facetdb::query::filter::ListQuery) -> Vec<String> {
    store.list(query).unwrap().into_iter().map(|d| d.simple_id).collect()
}

#[test]
fn scenario_creation_order_and_status_partitioning() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(todo_config(&dir.path().join("db.json"))).unwrap();

    let a = store.add("A", "", DimensionMap::new()).unwrap();
    let x = store
        .add("X", "", [("parent_id".to_string(), a.uuid.to_string().into())].into_iter().collect())
        .unwrap();
    let _y = store
        .add("Y", "", [("parent_id".to_string(), a.uuid.to_string().into())].into_iter().collect())
        .unwrap();
    let _z = store
        .add("Z", "", [("parent_id".to_string(), a.uuid.to_string().into())].into_iter().collect())
        .unwrap();

    let all = facetdb::query::filter::ListQuery::new();
    assert_eq!(simple_ids(&store, &all), vec!["1", "1.1", "1.2", "1.3"]);

    // Mark Y completed.
    let y_uuid = store.resolve("1.2").unwrap();
    store
        .update(&y_uuid.to_string(), UpdateRequest::new().with_dimension("status", "completed"))
        .unwrap();

    let pending_only = facetdb::query::filter::ListQuery::new().with_filter("status", "pending");
    assert_eq!(simple_ids(&store, &pending_only), vec!["1", "1.1", "1.2"]);
    assert_eq!(simple_ids(&store, &all), vec!["1", "1.1", "1.2", "1.c1"]);

    // Reopening Y via its current ID returns it to its creation-order slot.
    store
        .update("1.c1", UpdateRequest::new().with_dimension("status", "pending"))
        .unwrap();
    assert_eq!(simple_ids(&store, &all), vec!["1", "1.1", "1.2", "1.3"]);

    let _ = x;
}

#[test]
fn scenario_root_priority_prefix_and_child() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(todo_config(&dir.path().join("db.json"))).unwrap();

    store.add("A", "", DimensionMap::new()).unwrap();
    let b = store.add("B", "", DimensionMap::new()).unwrap();
    store
        .update(&b.uuid.to_string(), UpdateRequest::new().with_dimension("priority", "high"))
        .unwrap();

    // Within-partition labels are 1-based per partition, not per sibling
    // group: once B is the lone high-priority root it is "1st" in that
    // partition, same compaction rule that gives Y "c1" rather than "c2"
    // in scenario_creation_order_and_status_partitioning.
    let all = facetdb::query::filter::ListQuery::new();
    assert_eq!(simple_ids(&store, &all), vec!["1", "h1"]);

    let p = store
        .add("P", "", [("parent_id".to_string(), b.uuid.to_string().into())].into_iter().collect())
        .unwrap();
    let id = store.short_ids().unwrap().get(&p.uuid).cloned().unwrap();
    assert_eq!(id, "h1.1");
}

#[test]
fn scenario_case_insensitive_search() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(todo_config(&dir.path().join("db.json"))).unwrap();

    store.add("Foo", "", DimensionMap::new()).unwrap();
    store.add("Foo bar", "", DimensionMap::new()).unwrap();
    store.add("Baz", "", DimensionMap::new()).unwrap();

    let lower = facetdb::query::filter::ListQuery::new().with_search("foo");
    assert_eq!(store.list(&lower).unwrap().len(), 2);

    let upper = facetdb::query::filter::ListQuery::new().with_search("FOO");
    assert_eq!(store.list(&upper).unwrap().len(), 2);
}

#[test]
fn scenario_update_by_uuids_partitions_default_before_completed() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(todo_config(&dir.path().join("db.json"))).unwrap();

    let u1 = store.add("1", "", DimensionMap::new()).unwrap();
    let _u2 = store.add("2", "", DimensionMap::new()).unwrap();
    let u3 = store.add("3", "", DimensionMap::new()).unwrap();

    let request = UpdateRequest::new().with_dimension("status", "completed");
    let changed = store.update_by_uuids(&[u1.uuid, u3.uuid], request).unwrap();
    assert_eq!(changed, 2);

    // Within-partition labels compact (see scenario_creation_order_and_
    // status_partitioning's Z: 1.3 -> 1.2 once Y leaves the default
    // partition): with u1 and u3 moved out, u2 is the sole remaining
    // default-partition document and renders "1", not "2".
    let all = facetdb::query::filter::ListQuery::new();
    assert_eq!(simple_ids(&store, &all), vec!["1", "c1", "c2"]);
}

#[test]
fn scenario_non_cascading_delete_is_a_conflict_and_leaves_snapshot_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("db.json");
    let store = Store::open(todo_config(&db_path)).unwrap();

    let parent = store.add("Parent", "", DimensionMap::new()).unwrap();
    store
        .add("Child", "", [("parent_id".to_string(), parent.uuid.to_string().into())].into_iter().collect())
        .unwrap();

    let before = std::fs::read(&db_path).unwrap();
    let err = store.delete(&parent.uuid.to_string(), false).unwrap_err();
    assert!(matches!(err.kind, facetdb::core::error::ErrorKind::Conflict));

    let after = std::fs::read(&db_path).unwrap();
    assert_eq!(before, after);
}

#[test]
fn dual_resolution_identity_holds_across_a_write() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(todo_config(&dir.path().join("db.json"))).unwrap();

    store.add("A", "", DimensionMap::new()).unwrap();
    let b = store.add("B", "", DimensionMap::new()).unwrap();
    store.add("C", "", DimensionMap::new()).unwrap();

    for listed in store.list(&facetdb::query::filter::ListQuery::new()).unwrap() {
        let resolved = store.resolve(&listed.simple_id).unwrap();
        assert_eq!(resolved, listed.document.uuid);
    }

    // A resolved short ID stays correct even after an unrelated write,
    // as long as the resolving happens against a fresh list.
    store
        .update(&b.uuid.to_string(), UpdateRequest::new().with_title("B renamed"))
        .unwrap();
    let listed = store.list(&facetdb::query::filter::ListQuery::new()).unwrap();
    for doc in &listed {
        let resolved = store.resolve(&doc.simple_id).unwrap();
        assert_eq!(resolved, doc.document.uuid);
    }
}

#[test]
fn prefix_order_insensitive_on_input() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(todo_config(&dir.path().join("db.json"))).unwrap();

    let root = store.add("Root", "", DimensionMap::new()).unwrap();
    let mut dims = DimensionMap::new();
    dims.insert("parent_id".to_string(), root.uuid.to_string().into());
    dims.insert("status".to_string(), "completed".into());
    dims.insert("priority".to_string(), "high".into());
    let child = store.add("Child", "", dims).unwrap();

    let via_hc = store.resolve("1.hc1").unwrap();
    let via_ch = store.resolve("1.ch1").unwrap();
    assert_eq!(via_hc, child.uuid);
    assert_eq!(via_ch, child.uuid);
}
