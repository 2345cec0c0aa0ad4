//! Query executor subsystem for framedex
//!
//! Resolves query trees to row-id sets against an index snapshot and projects
//! them back onto the records.
//!
//! # Evaluation Flow
//!
//! 1. Reject trees nested deeper than the configured limit
//! 2. Resolve each predicate field through the string index or the numeric backend
//! 3. Fold compound children with AND/OR
//! 4. Complement excluded nodes against the universe
//! 5. Return records in row-id order
//!
//! # Invariants
//!
//! - Results are always subsets of the universe
//! - A predicate and its exclusion partition the universe
//! - Evaluation never mutates the snapshot

mod collection;
mod errors;
mod evaluator;
mod result;

pub use collection::IndexedCollection;
pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult, Severity};
pub use evaluator::QueryEvaluator;
pub use result::Group;
