//! Compound queries
//!
//! An ordered list of child predicates or compound queries folded with a
//! single combinator. Nesting is unrestricted here; depth limits are
//! enforced where queries are evaluated.

use std::fmt;

use super::errors::{PlannerError, PlannerResult};
use super::node::QueryNode;

/// Combinator applied across a compound query's children
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Operation {
    /// Intersection
    And,
    /// Union
    #[default]
    Or,
}

impl Operation {
    /// Parses `AND` / `OR` (case-insensitive)
    pub fn parse(name: &str) -> PlannerResult<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Operation::And),
            "OR" => Ok(Operation::Or),
            _ => Err(PlannerError::invalid_operation(name)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::And => "AND",
            Operation::Or => "OR",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Boolean tree of predicates and compound queries.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundQuery {
    children: Vec<QueryNode>,
    operation: Operation,
    include: bool,
}

impl Default for CompoundQuery {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            operation: Operation::Or,
            include: true,
        }
    }
}

impl CompoundQuery {
    /// Empty OR query
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty AND query
    pub fn and() -> Self {
        Self {
            operation: Operation::And,
            ..Self::default()
        }
    }

    /// Empty OR query
    pub fn or() -> Self {
        Self::default()
    }

    /// Appends a child
    pub fn add(&mut self, child: impl Into<QueryNode>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    /// Builder form of `add`
    pub fn with_child(mut self, child: impl Into<QueryNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Sets the combinator from its name
    pub fn set_operation(&mut self, operation: &str) -> PlannerResult<&mut Self> {
        self.operation = Operation::parse(operation)?;
        Ok(self)
    }

    pub fn set_operation_kind(&mut self, operation: Operation) -> &mut Self {
        self.operation = operation;
        self
    }

    /// `true` returns matches, `false` returns their complement
    pub fn set_include(&mut self, include: bool) -> &mut Self {
        self.include = include;
        self
    }

    pub fn set_exclude(&mut self, exclude: bool) -> &mut Self {
        self.include = !exclude;
        self
    }

    pub fn include(&self) -> bool {
        self.include
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn children(&self) -> &[QueryNode] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
