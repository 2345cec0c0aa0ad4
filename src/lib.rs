//! framedex - an in-memory index and query engine for visual-media annotations
//!
//! Records (per-frame detections, time-ranged segments, free-form metadata)
//! are indexed into per-field lookup structures and filtered with
//! declarative predicates combined by AND/OR/NOT, ranges and grouping.
//!
//! ```ignore
//! use framedex::{Detection, IndexedCollection, Predicate};
//!
//! let mut collection = IndexedCollection::with_defaults();
//! collection.load(vec![Detection::new(0.0, "car"), Detection::new(1.0, "bus")])?;
//!
//! let mut cars = Predicate::detection();
//! cars.match_value("car")?;
//! let records = collection.query(&cars.into())?;
//! ```

pub mod config;
pub mod executor;
pub mod index;
pub mod observability;
pub mod planner;
pub mod schema;

pub use config::{ConfigError, EngineConfig};
pub use executor::{ExecutorError, Group, IndexedCollection, QueryEvaluator};
pub use index::{BackendPreference, FieldIndexer, GroupKey, IndexSnapshot, RowId, RowIdSet};
pub use planner::{CompoundQuery, MatchValue, Operation, Predicate, QueryNode};
pub use schema::{Detection, Record, RecordKind, Segment};
