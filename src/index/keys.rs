//! Totally ordered scalar keys
//!
//! Used to bucket records by a field value when grouping. Ordering is
//! deterministic: Bool < Int < Float < String.

use std::fmt;

use serde_json::Value;

/// A scalar field value usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Bool(bool),
    Int(i64),
    /// Float stored as order-preserving bits
    Float(u64),
    String(String),
}

/// Bounds of the f64 values that convert to i64 exactly
const I64_MIN_F: f64 = -9_223_372_036_854_775_808.0;
const I64_END_F: f64 = 9_223_372_036_854_775_808.0;

impl GroupKey {
    /// Creates a key from a float.
    ///
    /// Negative values have all bits flipped, positive values only the sign
    /// bit, so the resulting integers sort like the floats.
    pub fn from_float(v: f64) -> Self {
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        GroupKey::Float(ordered)
    }

    /// Creates a key from a number, keyed by value.
    ///
    /// Integral values within i64 range become `Int` (so `1`, `1.0` and
    /// `-0.0`/`0.0` collapse); everything else becomes `Float`.
    pub fn from_number(v: f64) -> Self {
        if v.fract() == 0.0 && v >= I64_MIN_F && v < I64_END_F {
            GroupKey::Int(v as i64)
        } else {
            GroupKey::from_float(v)
        }
    }

    /// Creates a key from a JSON scalar. Arrays, objects and null have no key.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(GroupKey::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(GroupKey::Int(i)),
                None => n.as_f64().map(GroupKey::from_number),
            },
            Value::String(s) => Some(GroupKey::String(s.clone())),
            _ => None,
        }
    }

    /// Recovers the float a `Float` key was made from
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GroupKey::Int(i) => Some(*i as f64),
            GroupKey::Float(ordered) => {
                let bits = if (ordered >> 63) == 1 {
                    ordered ^ (1 << 63)
                } else {
                    !ordered
                };
                Some(f64::from_bits(bits))
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GroupKey::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Bool(b) => write!(f, "{}", b),
            GroupKey::Int(i) => write!(f, "{}", i),
            GroupKey::Float(_) => write!(f, "{}", self.as_f64().unwrap_or(f64::NAN)),
            GroupKey::String(s) => write!(f, "{}", s),
        }
    }
}
