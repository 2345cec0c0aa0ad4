//! Query tree nodes and their declarative JSON form
//!
//! Predicate:
//!
//! ```json
//! {"schema": "detection", "match": {"value": "car", "min_confidence": 0.5}, "include": true}
//! ```
//!
//! Compound query:
//!
//! ```json
//! {"operation": "AND", "queries": [ ... ], "include": false}
//! ```

use serde_json::{Map, Value};

use crate::schema::{json_kind, RecordKind};

use super::compound::CompoundQuery;
use super::errors::{PlannerError, PlannerResult};
use super::predicate::Predicate;

/// Either query shape
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    Predicate(Predicate),
    Compound(CompoundQuery),
}

impl QueryNode {
    pub fn include(&self) -> bool {
        match self {
            QueryNode::Predicate(p) => p.include(),
            QueryNode::Compound(c) => c.include(),
        }
    }

    /// Nesting depth; a lone predicate has depth 1
    pub fn depth(&self) -> usize {
        self.walk_depth(usize::MAX)
    }

    /// True if the tree is nested deeper than `limit`.
    ///
    /// Stops descending as soon as the limit is passed.
    pub fn exceeds_depth(&self, limit: usize) -> bool {
        self.walk_depth(limit) > limit
    }

    /// Deepest level reached, walking at most one level past `limit`
    fn walk_depth(&self, limit: usize) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];

        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            if level > limit {
                break;
            }
            if let QueryNode::Compound(c) = node {
                stack.extend(c.children().iter().map(|child| (child, level + 1)));
            }
        }
        deepest
    }

    /// Parses the declarative JSON form
    pub fn from_json(value: &Value) -> PlannerResult<Self> {
        let Value::Object(object) = value else {
            return Err(PlannerError::malformed_query(format!(
                "query must be an object, got {}",
                json_kind(value)
            )));
        };

        match (object.get("schema"), object.get("queries")) {
            (Some(_), Some(_)) => Err(PlannerError::malformed_query(
                "query has both 'schema' and 'queries'",
            )),
            (Some(schema), None) => parse_predicate(schema, object).map(QueryNode::Predicate),
            (None, Some(queries)) => parse_compound(queries, object).map(QueryNode::Compound),
            (None, None) => Err(PlannerError::malformed_query(
                "query has neither 'schema' nor 'queries'",
            )),
        }
    }
}

impl From<Predicate> for QueryNode {
    fn from(predicate: Predicate) -> Self {
        QueryNode::Predicate(predicate)
    }
}

impl From<CompoundQuery> for QueryNode {
    fn from(compound: CompoundQuery) -> Self {
        QueryNode::Compound(compound)
    }
}

fn parse_predicate(schema: &Value, object: &Map<String, Value>) -> PlannerResult<Predicate> {
    let kind = schema
        .as_str()
        .and_then(RecordKind::parse)
        .ok_or_else(|| PlannerError::malformed_query(format!("unknown schema {}", schema)))?;

    let mut predicate = Predicate::for_kind(kind);
    match object.get("match") {
        None => {}
        Some(Value::Object(mapping)) => {
            predicate.set(mapping)?;
        }
        Some(other) => {
            return Err(PlannerError::malformed_query(format!(
                "'match' must be an object, got {}",
                json_kind(other)
            )))
        }
    }
    apply_flags(object, |include| {
        predicate.set_include(include);
    })?;
    Ok(predicate)
}

fn parse_compound(queries: &Value, object: &Map<String, Value>) -> PlannerResult<CompoundQuery> {
    let Value::Array(children) = queries else {
        return Err(PlannerError::malformed_query(format!(
            "'queries' must be an array, got {}",
            json_kind(queries)
        )));
    };

    let mut compound = CompoundQuery::new();
    match object.get("operation") {
        None => {}
        Some(Value::String(operation)) => {
            compound.set_operation(operation)?;
        }
        Some(other) => {
            return Err(PlannerError::malformed_query(format!(
                "'operation' must be a string, got {}",
                json_kind(other)
            )))
        }
    }
    for child in children {
        compound.add(QueryNode::from_json(child)?);
    }
    apply_flags(object, |include| {
        compound.set_include(include);
    })?;
    Ok(compound)
}

/// Applies top-level `include` / `exclude` flags
fn apply_flags(object: &Map<String, Value>, mut set_include: impl FnMut(bool)) -> PlannerResult<()> {
    for (key, invert) in [("include", false), ("exclude", true)] {
        match object.get(key) {
            None => {}
            Some(Value::Bool(flag)) => set_include(*flag != invert),
            Some(other) => {
                return Err(PlannerError::malformed_query(format!(
                    "'{}' must be a bool, got {}",
                    key,
                    json_kind(other)
                )))
            }
        }
    }
    Ok(())
}
