//! Field indexer
//!
//! Turns a record collection into an immutable index snapshot:
//!
//! 1. Order records by the highest-priority timestamp field present
//! 2. Walk every record, classifying each scalar by its runtime type
//! 3. Finalize numeric series into row-aligned arrays
//! 4. Capture the row-id universe `0..N`
//!
//! No schema validation happens here. A path that changes classification
//! between records keeps only its latest classification.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::schema::{Record, TIMESTAMP_FIELDS};

use super::errors::{IndexError, IndexResult};
use super::field_index::{FieldIndex, FieldNode, NumericSeries, StringIndex, NO_VALUE};
use super::{RowId, RowIdSet};

/// A built index together with the records it was built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSnapshot {
    records: Vec<Record>,
    index: FieldIndex,
    universe: RowIdSet,
    sort_field: Option<&'static str>,
}

impl IndexSnapshot {
    /// Records in row-id order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn index(&self) -> &FieldIndex {
        &self.index
    }

    /// Every row id of this snapshot
    pub fn universe(&self) -> &RowIdSet {
        &self.universe
    }

    /// Timestamp field the records were ordered by, if any
    pub fn sort_field(&self) -> Option<&'static str> {
        self.sort_field
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, row: RowId) -> Option<&Record> {
        self.records.get(row as usize)
    }
}

/// Builds index snapshots from record collections
#[derive(Debug, Clone, Copy)]
pub struct FieldIndexer {
    order_by_timestamp: bool,
}

impl Default for FieldIndexer {
    fn default() -> Self {
        Self {
            order_by_timestamp: true,
        }
    }
}

impl FieldIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables timestamp ordering of rows
    pub fn with_timestamp_ordering(mut self, enabled: bool) -> Self {
        self.order_by_timestamp = enabled;
        self
    }

    /// Builds a fresh snapshot.
    ///
    /// Fails only when the collection has more records than row ids.
    pub fn build(&self, mut records: Vec<Record>) -> IndexResult<IndexSnapshot> {
        let row_count =
            RowId::try_from(records.len()).map_err(|_| IndexError::too_many_records(records.len()))?;

        let sort_field = if self.order_by_timestamp {
            order_by_timestamp(&mut records)
        } else {
            None
        };

        let mut root = BTreeMap::new();
        for (row, record) in records.iter().enumerate() {
            for (name, value) in record.fields() {
                walk(&mut root, name, value, row as RowId);
            }
        }

        let mut universe = RowIdSet::new();
        universe.insert_range(0..row_count);

        Ok(IndexSnapshot {
            index: finish_branch(root, records.len()),
            records,
            universe,
            sort_field,
        })
    }
}

/// Stable-sorts records by the first timestamp field any record carries.
///
/// Records without that field keep their relative order after all others.
fn order_by_timestamp(records: &mut [Record]) -> Option<&'static str> {
    let field = TIMESTAMP_FIELDS
        .iter()
        .copied()
        .find(|name| records.iter().any(|r| r.number(name).is_some()))?;

    records.sort_by(|a, b| match (a.number(field), b.number(field)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    Some(field)
}

/// Build-time node; numeric series grow until finalized
enum BuildNode {
    Branch(BTreeMap<String, BuildNode>),
    Strings(StringIndex),
    Numbers(Vec<f64>),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum NodeClass {
    Branch,
    Strings,
    Numbers,
}

impl BuildNode {
    fn empty(class: NodeClass) -> Self {
        match class {
            NodeClass::Branch => BuildNode::Branch(BTreeMap::new()),
            NodeClass::Strings => BuildNode::Strings(StringIndex::new()),
            NodeClass::Numbers => BuildNode::Numbers(Vec::new()),
        }
    }

    fn class(&self) -> NodeClass {
        match self {
            BuildNode::Branch(_) => NodeClass::Branch,
            BuildNode::Strings(_) => NodeClass::Strings,
            BuildNode::Numbers(_) => NodeClass::Numbers,
        }
    }
}

/// Returns the node at `key`, replacing it if its classification differs
fn node_for<'a>(
    children: &'a mut BTreeMap<String, BuildNode>,
    key: &str,
    class: NodeClass,
) -> &'a mut BuildNode {
    let node = children
        .entry(key.to_string())
        .or_insert_with(|| BuildNode::empty(class));
    if node.class() != class {
        *node = BuildNode::empty(class);
    }
    node
}

fn walk(children: &mut BTreeMap<String, BuildNode>, key: &str, value: &Value, row: RowId) {
    match value {
        Value::String(text) => {
            if let BuildNode::Strings(index) = node_for(children, key, NodeClass::Strings) {
                index.insert(text, row);
            }
        }
        Value::Number(number) => {
            let Some(v) = number.as_f64() else { return };
            if let BuildNode::Numbers(series) = node_for(children, key, NodeClass::Numbers) {
                set_slot(series, row as usize, v);
            }
        }
        Value::Object(map) => {
            if let BuildNode::Branch(branch) = node_for(children, key, NodeClass::Branch) {
                for (name, child) in map {
                    walk(branch, name, child, row);
                }
            }
        }
        Value::Array(items) => {
            if let BuildNode::Branch(branch) = node_for(children, key, NodeClass::Branch) {
                for (position, child) in items.iter().enumerate() {
                    walk(branch, &position.to_string(), child, row);
                }
            }
        }
        Value::Bool(_) | Value::Null => {}
    }
}

/// Writes `value` at `row`, back-filling skipped rows with the gap marker
fn set_slot(series: &mut Vec<f64>, row: usize, value: f64) {
    if series.len() <= row {
        series.resize(row + 1, NO_VALUE);
    }
    series[row] = value;
}

fn finish_branch(children: BTreeMap<String, BuildNode>, row_count: usize) -> FieldIndex {
    let finished = children
        .into_iter()
        .map(|(name, node)| {
            let node = match node {
                BuildNode::Branch(branch) => FieldNode::Branch(finish_branch(branch, row_count)),
                BuildNode::Strings(index) => FieldNode::Strings(index),
                BuildNode::Numbers(mut values) => {
                    values.resize(row_count, NO_VALUE);
                    FieldNode::Numbers(NumericSeries::from_values(values))
                }
            };
            (name, node)
        })
        .collect();
    FieldIndex::from_children(finished)
}
