//! Field indexer subsystem for framedex
//!
//! Indexes are derived, in-memory-only snapshots rebuilt from scratch on
//! every load.
//!
//! # Design Principles
//!
//! - Derived state: an index mirrors one record collection, never updated in place
//! - Deterministic: BTreeMap iteration order, stable timestamp ordering
//! - Row aligned: every numeric series has exactly one slot per row
//!
//! # Invariants
//!
//! - Row ids are 0-based positions after ordering
//! - The universe is exactly `0..N` for the snapshot it belongs to
//! - Backend choice never changes a result

mod backend;
mod builder;
mod errors;
mod field_index;
mod keys;

pub use backend::{
    probe_parallelism, select_backend, BackendPreference, CpuBackend, NumericBackend,
    ParallelBackend, DEFAULT_CHUNK_SIZE,
};
pub use builder::{FieldIndexer, IndexSnapshot};
pub use errors::{IndexError, IndexErrorCode, IndexResult};
pub use field_index::{FieldIndex, FieldNode, NumericSeries, StringIndex, NO_VALUE};
pub use keys::GroupKey;

/// Position of a record after ordering
pub type RowId = u32;

/// A set of row ids, iterated in ascending order
pub type RowIdSet = roaring::RoaringBitmap;
