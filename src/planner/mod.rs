//! Query model for framedex
//!
//! Two declarative shapes:
//!
//! - `Predicate`: conjunctive match / range conditions over one record's fields
//! - `CompoundQuery`: an AND / OR fold over child predicates and compound queries
//!
//! Both carry an `include` flag; when false the evaluator returns the
//! complement of the match against the collection's full row universe.
//!
//! # Design Principles
//!
//! - Pure data: building a query never evaluates it
//! - Table driven: predicate fields come from the schema's descriptor table
//! - Explicit: unknown fields and wrong value kinds are rejected at build time

mod compound;
mod errors;
mod node;
mod predicate;

pub use compound::{CompoundQuery, Operation};
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult};
pub use node::QueryNode;
pub use predicate::{Condition, MatchValue, Predicate, MAX_PREFIX, MIN_PREFIX};
