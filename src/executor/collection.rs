//! Indexed collection
//!
//! Owns one record collection, its index snapshot and the numeric backend
//! chosen at construction. Loading replaces the snapshot wholesale; queries
//! borrow records from the current snapshot.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::EngineConfig;
use crate::index::{
    select_backend, FieldIndex, FieldIndexer, GroupKey, IndexResult, IndexSnapshot, NumericBackend,
    RowIdSet,
};
use crate::observability::{
    log_event_with_fields, trace_event_with_fields, Event, Logger, MetricsRegistry, ObservationScope,
};
use crate::planner::QueryNode;
use crate::schema::Record;

use super::errors::{ExecutorError, ExecutorResult};
use super::evaluator::QueryEvaluator;
use super::result::Group;

/// A record collection with its derived index
#[derive(Debug)]
pub struct IndexedCollection {
    config: EngineConfig,
    backend: Box<dyn NumericBackend>,
    indexer: FieldIndexer,
    snapshot: IndexSnapshot,
    metrics: MetricsRegistry,
}

impl Default for IndexedCollection {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl IndexedCollection {
    /// Creates an empty collection; selects the numeric backend once.
    ///
    /// `config.log_level` sets the process-wide logger threshold, so it
    /// also applies to every other collection in the process.
    pub fn new(config: EngineConfig) -> Self {
        Logger::set_level(config.log_level);

        let backend = select_backend(config.backend);
        log_event_with_fields(Event::BackendSelected, &[("backend", backend.name())]);

        Self {
            indexer: FieldIndexer::new().with_timestamp_ordering(config.sort_by_timestamp),
            config,
            backend,
            snapshot: IndexSnapshot::default(),
            metrics: MetricsRegistry::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Replaces the collection and rebuilds the index from scratch.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn load<I, R>(&mut self, records: I) -> IndexResult<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<Record>,
    {
        let records: Vec<Record> = records.into_iter().map(Into::into).collect();
        let count = records.len().to_string();
        let scope = ObservationScope::with_fields("INDEX_BUILD", &[("records", count.as_str())]);

        match self.indexer.build(records) {
            Ok(snapshot) => {
                self.metrics.record_index_build(snapshot.row_count() as u64);
                let rows = snapshot.row_count().to_string();
                scope.complete_with_fields(&[
                    ("rows", rows.as_str()),
                    ("sort_field", snapshot.sort_field().unwrap_or("none")),
                ]);
                self.snapshot = snapshot;
                Ok(())
            }
            Err(err) => {
                scope.fail(err.message());
                log_event_with_fields(Event::IndexBuildFailed, &[("code", err.code().code())]);
                Err(err)
            }
        }
    }

    /// Refuses query trees the evaluator will not walk
    pub fn validate(&self, node: &QueryNode) -> ExecutorResult<()> {
        if node.exceeds_depth(self.config.max_query_depth) {
            return Err(ExecutorError::malformed_query(format!(
                "query depth exceeds limit {}",
                self.config.max_query_depth
            )));
        }
        Ok(())
    }

    /// Row ids matched by `node`
    pub fn row_ids(&self, node: &QueryNode) -> ExecutorResult<RowIdSet> {
        let result = self.validate(node).and_then(|_| self.evaluator().evaluate(node));

        match &result {
            Ok(rows) => {
                self.metrics.increment_queries_executed();
                trace_event_with_fields(Event::QueryExecuted, &[("rows", rows.len().to_string().as_str())]);
            }
            Err(err) => self.reject(err),
        }
        result
    }

    /// Records matched by `node`, in row-id order
    pub fn query(&self, node: &QueryNode) -> ExecutorResult<Vec<&Record>> {
        let rows = self.row_ids(node)?;
        Ok(self.project(&rows))
    }

    /// Parses the declarative JSON form and runs it
    pub fn query_json(&self, query: &Value) -> ExecutorResult<Vec<&Record>> {
        let node = QueryNode::from_json(query)
            .map_err(ExecutorError::from)
            .inspect_err(|err| self.reject(err))?;
        self.query(&node)
    }

    /// Runs every query, buckets each result by `group_field` and keeps only
    /// the keys present in all of them.
    ///
    /// Groups come out in the order their key first appears in the first
    /// query's results. Records without a scalar at `group_field` are skipped.
    pub fn group_query(&self, queries: &[QueryNode], group_field: &str) -> ExecutorResult<Vec<Group<'_>>> {
        let mut buckets: Vec<BTreeMap<GroupKey, Vec<&Record>>> = Vec::with_capacity(queries.len());
        let mut key_order: Vec<GroupKey> = Vec::new();

        for (position, query) in queries.iter().enumerate() {
            let mut bucket: BTreeMap<GroupKey, Vec<&Record>> = BTreeMap::new();
            for record in self.query(query)? {
                let Some(key) = record.get_path(group_field).and_then(GroupKey::from_json) else {
                    continue;
                };
                if position == 0 && !bucket.contains_key(&key) {
                    key_order.push(key.clone());
                }
                bucket.entry(key).or_default().push(record);
            }
            buckets.push(bucket);
        }

        let mut groups: Vec<Group<'_>> = Vec::new();
        for key in key_order {
            if !buckets.iter().all(|bucket| bucket.contains_key(&key)) {
                continue;
            }
            let parts = buckets
                .iter_mut()
                .map(|bucket| bucket.remove(&key).unwrap_or_default())
                .collect();
            groups.push(Group { key, parts });
        }

        self.metrics.record_group_query(groups.len() as u64);
        log_event_with_fields(
            Event::GroupQueryExecuted,
            &[
                ("field", group_field),
                ("groups", groups.len().to_string().as_str()),
                ("queries", queries.len().to_string().as_str()),
            ],
        );
        Ok(groups)
    }

    fn evaluator(&self) -> QueryEvaluator<'_> {
        QueryEvaluator::new(self.snapshot.index(), self.snapshot.universe(), self.backend.as_ref())
    }

    fn project(&self, rows: &RowIdSet) -> Vec<&Record> {
        rows.iter().filter_map(|row| self.snapshot.record(row)).collect()
    }

    fn reject(&self, err: &ExecutorError) {
        self.metrics.increment_queries_rejected();
        if err.is_unknown_value() {
            self.metrics.increment_unknown_values();
        }
        log_event_with_fields(
            Event::QueryRejected,
            &[("code", err.code().code()), ("reason", err.message())],
        );
    }

    /// Records in row-id order
    pub fn records(&self) -> &[Record] {
        self.snapshot.records()
    }

    pub fn len(&self) -> usize {
        self.snapshot.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self) -> &FieldIndex {
        self.snapshot.index()
    }

    pub fn universe(&self) -> &RowIdSet {
        self.snapshot.universe()
    }

    pub fn snapshot(&self) -> &IndexSnapshot {
        &self.snapshot
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutorErrorCode;
    use crate::index::BackendPreference;
    use crate::observability::LogLevel;
    use crate::planner::{CompoundQuery, Predicate};
    use crate::schema::Detection;
    use serde_json::json;

    fn quiet() -> EngineConfig {
        EngineConfig::default()
            .with_backend(BackendPreference::Cpu)
            .with_log_level(LogLevel::Off)
    }

    fn loaded() -> IndexedCollection {
        let mut collection = IndexedCollection::new(quiet());
        collection
            .load(vec![
                Detection::new(3.0, "A").with_source("cam2"),
                Detection::new(1.0, "B").with_source("cam1"),
                Detection::new(2.0, "A").with_source("cam1"),
            ])
            .unwrap();
        collection
    }

    #[test]
    fn test_load_orders_by_timestamp() {
        let collection = loaded();
        let times: Vec<f64> = collection.records().iter().filter_map(|r| r.number("t")).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.universe().len(), 3);
        assert_eq!(collection.snapshot().sort_field(), Some("t"));
    }

    #[test]
    fn test_query_returns_records_in_row_order() {
        let collection = loaded();
        let mut predicate = Predicate::detection();
        predicate.match_value("A").unwrap();

        let records = collection.query(&predicate.into()).unwrap();
        let times: Vec<f64> = records.iter().filter_map(|r| r.number("t")).collect();
        assert_eq!(times, vec![2.0, 3.0]);
    }

    #[test]
    fn test_query_on_empty_collection() {
        let collection = IndexedCollection::new(quiet());
        let mut predicate = Predicate::detection();
        predicate.set_exclude(true);
        assert!(collection.query(&predicate.into()).unwrap().is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let collection = IndexedCollection::new(quiet().with_max_query_depth(2));
        let inner = CompoundQuery::or().with_child(Predicate::detection());
        let outer = CompoundQuery::and().with_child(inner);

        let err = collection.row_ids(&outer.into()).unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::FramedexMalformedQuery);
        assert_eq!(collection.metrics().snapshot().queries_rejected, 1);
    }

    #[test]
    fn test_depth_limit_on_deep_tree() {
        let collection = IndexedCollection::new(quiet());
        let mut node: QueryNode = Predicate::detection().into();
        for _ in 0..2_000 {
            node = CompoundQuery::and().with_child(node).into();
        }

        let err = collection.validate(&node).unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::FramedexMalformedQuery);
        assert!(err.message().contains("64"));
    }

    #[test]
    fn test_log_level_is_process_wide() {
        use crate::observability::{Logger, Severity};

        let _first = IndexedCollection::new(quiet().with_log_level(LogLevel::Error));
        assert!(!Logger::enabled(Severity::Warn));

        let _second = IndexedCollection::new(quiet().with_log_level(LogLevel::Off));
        assert!(!Logger::enabled(Severity::Fatal));
    }

    #[test]
    fn test_metrics_track_queries() {
        let collection = loaded();
        let mut found = Predicate::detection();
        found.match_value("A").unwrap();
        let mut missing = Predicate::detection();
        missing.match_value("Z").unwrap();

        collection.row_ids(&found.into()).unwrap();
        assert!(collection.row_ids(&missing.into()).unwrap_err().is_unknown_value());

        let snapshot = collection.metrics().snapshot();
        assert_eq!(snapshot.index_builds, 1);
        assert_eq!(snapshot.records_indexed, 3);
        assert_eq!(snapshot.queries_executed, 1);
        assert_eq!(snapshot.queries_rejected, 1);
        assert_eq!(snapshot.unknown_values, 1);
    }

    #[test]
    fn test_query_json() {
        let collection = loaded();
        let records = collection
            .query_json(&json!({"schema": "detection", "match": {"source": "cam1"}}))
            .unwrap();
        assert_eq!(records.len(), 2);

        let err = collection.query_json(&json!([1, 2])).unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::FramedexMalformedQuery);
    }

    #[test]
    fn test_group_query_by_source() {
        let collection = loaded();
        let mut a = Predicate::detection();
        a.match_value("A").unwrap();
        let mut b = Predicate::detection();
        b.match_value("B").unwrap();

        let groups = collection.group_query(&[a.into(), b.into()], "source").unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, GroupKey::String("cam1".into()));
        assert_eq!(groups[0].part(0).len(), 1);
        assert_eq!(groups[0].part(1).len(), 1);
        assert_eq!(collection.metrics().snapshot().groups_emitted, 1);
    }

    #[test]
    fn test_group_query_without_queries() {
        let collection = loaded();
        assert!(collection.group_query(&[], "source").unwrap().is_empty());
    }

    #[test]
    fn test_backend_name_follows_config() {
        let collection = IndexedCollection::new(quiet().with_backend(BackendPreference::Parallel));
        assert_eq!(collection.backend_name(), "parallel");
        assert_eq!(collection.config().backend, BackendPreference::Parallel);
    }
}
