//! Result types for grouped queries

use crate::index::GroupKey;
use crate::schema::Record;

/// Records sharing one group key across every query of a group query.
///
/// `parts[i]` holds the i-th query's records for this key, in row-id order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub key: GroupKey,
    pub parts: Vec<Vec<&'a Record>>,
}

impl<'a> Group<'a> {
    /// All records of the group, query by query
    pub fn records(&self) -> Vec<&'a Record> {
        self.parts.iter().flatten().copied().collect()
    }

    /// Records contributed by the query at `position`
    pub fn part(&self, position: usize) -> &[&'a Record] {
        self.parts.get(position).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of records in the group
    pub fn len(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
