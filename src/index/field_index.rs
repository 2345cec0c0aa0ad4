//! Field index structures
//!
//! The field index is a tree keyed by field path segments. Leaves are either
//! a string index (value -> row ids) or a numeric series (one slot per row,
//! NaN where the row has no value).

use std::collections::BTreeMap;

use crate::schema::PATH_SEPARATOR;

use super::{RowId, RowIdSet};

/// Marker stored in a numeric series for rows that lack the field
pub const NO_VALUE: f64 = f64::NAN;

/// Inverted index from string value to the rows holding it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringIndex {
    values: BTreeMap<String, RowIdSet>,
}

impl StringIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `row` holds `value`
    pub fn insert(&mut self, value: &str, row: RowId) {
        match self.values.get_mut(value) {
            Some(rows) => {
                rows.insert(row);
            }
            None => {
                let mut rows = RowIdSet::new();
                rows.insert(row);
                self.values.insert(value.to_string(), rows);
            }
        }
    }

    /// Rows holding exactly `value`, or None if no row ever did
    pub fn get(&self, value: &str) -> Option<&RowIdSet> {
        self.values.get(value)
    }

    /// Distinct values in lexicographic order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Row-aligned numeric values of one field path.
///
/// Always exactly as long as the collection it was built from.
#[derive(Debug, Clone, Default)]
pub struct NumericSeries {
    values: Box<[f64]>,
}

impl NumericSeries {
    /// Wraps a finished, row-aligned value array
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values: values.into_boxed_slice(),
        }
    }

    /// Value at `row`, None when the row has no value
    pub fn get(&self, row: RowId) -> Option<f64> {
        self.values
            .get(row as usize)
            .copied()
            .filter(|v| !v.is_nan())
    }

    /// Raw row-aligned values, NaN marks a gap
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Number of slots (equals the collection's row count)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of rows that hold a value
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}

impl PartialEq for NumericSeries {
    // Bitwise so that gap markers compare equal to each other.
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

/// A node of the field index tree
#[derive(Debug, Clone, PartialEq)]
pub enum FieldNode {
    /// Nested object or array; children keyed by field name or position
    Branch(FieldIndex),
    /// Field classified as text
    Strings(StringIndex),
    /// Field classified as numeric
    Numbers(NumericSeries),
}

impl FieldNode {
    pub fn as_strings(&self) -> Option<&StringIndex> {
        match self {
            FieldNode::Strings(index) => Some(index),
            _ => None,
        }
    }

    pub fn as_numbers(&self) -> Option<&NumericSeries> {
        match self {
            FieldNode::Numbers(series) => Some(series),
            _ => None,
        }
    }
}

/// Per-field index over one record collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldIndex {
    children: BTreeMap<String, FieldNode>,
}

impl FieldIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_children(children: BTreeMap<String, FieldNode>) -> Self {
        Self { children }
    }

    /// Resolves a dotted field path to its node
    pub fn get(&self, path: &str) -> Option<&FieldNode> {
        let mut segments = path.split(PATH_SEPARATOR);
        let mut node = self.children.get(segments.next()?)?;

        for segment in segments {
            node = match node {
                FieldNode::Branch(index) => index.children.get(segment)?,
                _ => return None,
            };
        }

        Some(node)
    }

    /// String index at `path`, if that path is classified as text
    pub fn strings(&self, path: &str) -> Option<&StringIndex> {
        self.get(path).and_then(FieldNode::as_strings)
    }

    /// Numeric series at `path`, if that path is classified as numeric
    pub fn numbers(&self, path: &str) -> Option<&NumericSeries> {
        self.get(path).and_then(FieldNode::as_numbers)
    }

    /// All leaf paths in lexicographic segment order
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths("", &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, node) in &self.children {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}{}{}", prefix, PATH_SEPARATOR, name)
            };
            match node {
                FieldNode::Branch(index) => index.collect_paths(&path, out),
                _ => out.push(path),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_index_insert_and_get() {
        let mut index = StringIndex::new();
        index.insert("car", 0);
        index.insert("car", 3);
        index.insert("face", 1);

        let rows: Vec<RowId> = index.get("car").unwrap().iter().collect();
        assert_eq!(rows, vec![0, 3]);
        assert!(index.get("dog").is_none());
        assert_eq!(index.values().collect::<Vec<_>>(), vec!["car", "face"]);
    }

    #[test]
    fn test_numeric_series_gaps() {
        let series = NumericSeries::from_values(vec![0.5, NO_VALUE, 2.0]);
        assert_eq!(series.get(0), Some(0.5));
        assert_eq!(series.get(1), None);
        assert_eq!(series.get(7), None);
        assert_eq!(series.present_count(), 2);
    }

    #[test]
    fn test_numeric_series_eq_treats_gaps_as_equal() {
        let a = NumericSeries::from_values(vec![1.0, NO_VALUE]);
        let b = NumericSeries::from_values(vec![1.0, NO_VALUE]);
        let c = NumericSeries::from_values(vec![1.0, 2.0]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_nested_lookup() {
        let mut inner = BTreeMap::new();
        inner.insert("x".to_string(), FieldNode::Numbers(NumericSeries::from_values(vec![0.1])));
        let mut root = BTreeMap::new();
        root.insert("point".to_string(), FieldNode::Branch(FieldIndex::from_children(inner)));
        root.insert("value".to_string(), FieldNode::Strings(StringIndex::new()));
        let index = FieldIndex::from_children(root);

        assert!(index.numbers("point.x").is_some());
        assert!(index.strings("point.x").is_none());
        assert!(index.get("value.x").is_none());
        assert_eq!(index.leaf_paths(), vec!["point.x", "value"]);
    }
}
