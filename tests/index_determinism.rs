//! Index Determinism Tests
//!
//! Tests for index invariants:
//! - Loading the same input twice yields identical snapshots and results
//! - Backends return identical row sets
//! - Rows are ordered by the highest-priority timestamp field
//! - Every numeric series is aligned with the row universe

use framedex::index::{BackendPreference, FieldIndexer, FieldNode, RowId};
use framedex::observability::LogLevel;
use framedex::{CompoundQuery, Detection, EngineConfig, IndexedCollection, Predicate, QueryNode, Record, Segment};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn config(backend: BackendPreference) -> EngineConfig {
    EngineConfig::default()
        .with_backend(backend)
        .with_log_level(LogLevel::Off)
}

/// A few thousand detections with gaps in `confidence` and out-of-order times.
fn many_detections() -> Vec<Record> {
    (0..5_000)
        .map(|i| {
            let t = ((i * 7919) % 5_000) as f64 / 10.0;
            let value = ["car", "bus", "person", "bike"][i % 4];
            let record = Detection::new(t, value)
                .with_confidence((i % 100) as f64 / 100.0)
                .with_source(if i % 3 == 0 { "cam1" } else { "cam2" })
                .into_record();
            if i % 13 == 0 {
                Record::from_json(json!({"t": t, "value": value})).unwrap()
            } else {
                record
            }
        })
        .collect()
}

fn sample_queries() -> Vec<QueryNode> {
    let mut cars = Predicate::detection();
    cars.match_value("car").unwrap();

    let mut confident = Predicate::detection();
    confident.set_min_confidence(0.5).unwrap().set_max_confidence(0.9).unwrap();

    let mut exact = Predicate::detection();
    exact.match_confidence(0.25).unwrap();

    let mut not_cam1 = Predicate::detection();
    not_cam1.match_source("cam1").unwrap().set_exclude(true);

    let mut and = CompoundQuery::and();
    and.add(cars.clone()).add(confident.clone());

    let mut or = CompoundQuery::or();
    or.add(exact.clone()).add(not_cam1.clone());
    or.set_exclude(true);

    vec![cars.into(), confident.into(), exact.into(), not_cam1.into(), and.into(), or.into()]
}

// =============================================================================
// Re-indexing Idempotence
// =============================================================================

/// Loading twice produces identical snapshots and identical results.
#[test]
fn test_load_twice_is_idempotent() {
    let mut collection = IndexedCollection::new(config(BackendPreference::Cpu));

    collection.load(many_detections()).unwrap();
    let first_snapshot = collection.snapshot().clone();
    let first_results: Vec<_> = sample_queries().iter().map(|q| collection.row_ids(q).unwrap()).collect();

    collection.load(many_detections()).unwrap();
    assert_eq!(collection.snapshot(), &first_snapshot);

    let second_results: Vec<_> = sample_queries().iter().map(|q| collection.row_ids(q).unwrap()).collect();
    assert_eq!(first_results, second_results);
    assert_eq!(collection.metrics().snapshot().index_builds, 2);
}

/// Reloading with different input replaces the previous collection entirely.
#[test]
fn test_load_replaces_previous_collection() {
    let mut collection = IndexedCollection::new(config(BackendPreference::Cpu));
    collection.load(many_detections()).unwrap();
    collection.load(vec![Detection::new(0.0, "tram")]).unwrap();

    assert_eq!(collection.len(), 1);
    assert!(collection.index().strings("value").unwrap().get("car").is_none());
}

/// Two independent builds of the same input are equal.
#[test]
fn test_builder_is_deterministic() {
    let indexer = FieldIndexer::new();
    assert_eq!(indexer.build(many_detections()).unwrap(), indexer.build(many_detections()).unwrap());
}

// =============================================================================
// Backend Equivalence
// =============================================================================

/// The backend never changes a result.
#[test]
fn test_backends_return_identical_results() {
    let mut cpu = IndexedCollection::new(config(BackendPreference::Cpu));
    let mut parallel = IndexedCollection::new(config(BackendPreference::Parallel));
    cpu.load(many_detections()).unwrap();
    parallel.load(many_detections()).unwrap();

    assert_eq!(cpu.backend_name(), "cpu");
    assert_eq!(parallel.backend_name(), "parallel");

    for query in sample_queries() {
        assert_eq!(cpu.row_ids(&query).unwrap(), parallel.row_ids(&query).unwrap(), "{:?}", query);
    }
}

// =============================================================================
// Ordering and Alignment
// =============================================================================

/// Rows come out in ascending timestamp order.
#[test]
fn test_rows_ordered_by_timestamp() {
    let mut collection = IndexedCollection::new(config(BackendPreference::Cpu));
    collection.load(many_detections()).unwrap();

    let times: Vec<f64> = collection.records().iter().filter_map(|r| r.number("t")).collect();
    assert_eq!(times.len(), collection.len());
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
}

/// Segment start times outrank point times; unkeyed records go last.
#[test]
fn test_timestamp_priority() {
    let mut collection = IndexedCollection::new(config(BackendPreference::Cpu));
    collection
        .load(vec![
            Detection::new(0.0, "point").into_record(),
            Segment::new(5.0, 6.0, "late").into_record(),
            Segment::new(1.0, 9.0, "early").into_record(),
        ])
        .unwrap();

    let values: Vec<&str> = collection.records().iter().filter_map(|r| r.text("value")).collect();
    assert_eq!(values, vec!["early", "late", "point"]);
    assert_eq!(collection.snapshot().sort_field(), Some("t1"));
}

/// Disabling ordering keeps input order.
#[test]
fn test_ordering_disabled_keeps_input_order() {
    let mut collection =
        IndexedCollection::new(config(BackendPreference::Cpu).with_timestamp_ordering(false));
    collection
        .load(vec![Detection::new(2.0, "b"), Detection::new(1.0, "a")])
        .unwrap();

    let values: Vec<&str> = collection.records().iter().filter_map(|r| r.text("value")).collect();
    assert_eq!(values, vec!["b", "a"]);
    assert_eq!(collection.snapshot().sort_field(), None);
}

/// Every numeric series has one slot per row; gaps are where the field is absent.
#[test]
fn test_numeric_series_aligned_with_rows() {
    let mut collection = IndexedCollection::new(config(BackendPreference::Cpu));
    collection.load(many_detections()).unwrap();

    for path in collection.index().leaf_paths() {
        if let Some(FieldNode::Numbers(series)) = collection.index().get(&path) {
            assert_eq!(series.len(), collection.len(), "{}", path);
        }
    }

    let confidence = collection.index().numbers("confidence").unwrap();
    for (row, record) in collection.records().iter().enumerate() {
        assert_eq!(confidence.get(row as RowId), record.number("confidence"));
    }
}
