//! Record schema for framedex
//!
//! Defines the two annotation record kinds and their sub-structures, the
//! open `Record` form every index operates on, and the static field tables
//! predicates are built from.
//!
//! # Invariants
//!
//! - `confidence` and `fraction` lie in [0, 1] (checked by `validate()`)
//! - A Detection carries `t`; a Segment carries `t1 <= t2`
//! - A Contour has exactly four points (enforced by its type)
//! - Records are never modified once handed to the indexer

mod errors;
mod fields;
mod record;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, ViolationDetails};
pub use fields::{
    FieldDescriptor, FieldKind, RecordSchema, DETECTION, DETECTION_FIELDS, SEGMENT,
    SEGMENT_FIELDS, TIMESTAMP_FIELDS,
};
pub use record::{Record, PATH_SEPARATOR};
pub(crate) use record::json_kind;
pub use types::{Contour, Detection, Footprint, Point, RecordKind, Region, Segment};
