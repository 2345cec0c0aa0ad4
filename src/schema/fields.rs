//! Field descriptor tables
//!
//! Each record kind exposes a fixed table of queryable scalar fields. The
//! tables are generated from a compact listing so that predicates never
//! need to inspect a record instance to learn which fields exist.

use super::types::RecordKind;

/// Value classification of a queryable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Matched exactly against the string index
    Text,
    /// Matched exactly or by inclusive range against the numeric series
    Number,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
        }
    }
}

/// A single queryable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Whether `min_<name>` / `max_<name>` bounds are accepted
    pub range_capable: bool,
}

macro_rules! field_table {
    ($(#[$meta:meta])* $vis:vis static $table:ident = { $($name:ident : $kind:ident),* $(,)? };) => {
        $(#[$meta])*
        $vis static $table: &[FieldDescriptor] = &[
            $(
                FieldDescriptor {
                    name: stringify!($name),
                    kind: FieldKind::$kind,
                    range_capable: matches!(FieldKind::$kind, FieldKind::Number),
                },
            )*
        ];
    };
}

field_table! {
    /// Queryable fields of a Detection
    pub static DETECTION_FIELDS = {
        t: Number,
        value: Text,
        tag_type: Text,
        source: Text,
        model: Text,
        confidence: Number,
        fraction: Number,
    };
}

field_table! {
    /// Queryable fields of a Segment
    pub static SEGMENT_FIELDS = {
        t1: Number,
        t2: Number,
        value: Text,
        tag_type: Text,
        source: Text,
        model: Text,
        confidence: Number,
        fraction: Number,
    };
}

/// Timestamp field names, highest ordering priority first
pub const TIMESTAMP_FIELDS: [&str; 3] = ["t1", "t2", "t"];

/// A record kind together with its field table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSchema {
    pub kind: RecordKind,
    pub fields: &'static [FieldDescriptor],
}

/// Detection schema
pub static DETECTION: RecordSchema = RecordSchema {
    kind: RecordKind::Detection,
    fields: DETECTION_FIELDS,
};

/// Segment schema
pub static SEGMENT: RecordSchema = RecordSchema {
    kind: RecordKind::Segment,
    fields: SEGMENT_FIELDS,
};

impl RecordSchema {
    /// Returns the schema for a record kind
    pub fn for_kind(kind: RecordKind) -> &'static RecordSchema {
        match kind {
            RecordKind::Detection => &DETECTION,
            RecordKind::Segment => &SEGMENT,
        }
    }

    /// Looks up a field descriptor by name
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field in the table, used for deterministic iteration
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}
