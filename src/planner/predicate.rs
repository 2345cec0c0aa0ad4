//! Single-record predicates
//!
//! A predicate is a conjunction of per-field conditions over one schema's
//! field table. Text fields accept an exact-match target; numeric fields
//! accept an exact-match target and inclusive `min` / `max` bounds.
//!
//! Predicates are plain data. Nothing here touches an index.

use serde_json::{Map, Value};

use crate::schema::{json_kind, FieldDescriptor, FieldKind, RecordKind, RecordSchema, DETECTION, SEGMENT};

use super::errors::{PlannerError, PlannerResult};

/// Key prefixes recognised by `Predicate::set` for range bounds
pub const MIN_PREFIX: &str = "min_";
pub const MAX_PREFIX: &str = "max_";

/// Exact-match target
#[derive(Debug, Clone, PartialEq)]
pub enum MatchValue {
    Text(String),
    Number(f64),
}

impl MatchValue {
    /// Field kind this target can be matched against
    pub fn kind(&self) -> FieldKind {
        match self {
            MatchValue::Text(_) => FieldKind::Text,
            MatchValue::Number(_) => FieldKind::Number,
        }
    }

    /// Converts a JSON string or number
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(MatchValue::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(MatchValue::Number),
            _ => None,
        }
    }
}

impl From<&str> for MatchValue {
    fn from(value: &str) -> Self {
        MatchValue::Text(value.to_string())
    }
}

impl From<String> for MatchValue {
    fn from(value: String) -> Self {
        MatchValue::Text(value)
    }
}

impl From<f64> for MatchValue {
    fn from(value: f64) -> Self {
        MatchValue::Number(value)
    }
}

impl From<i64> for MatchValue {
    fn from(value: i64) -> Self {
        MatchValue::Number(value as f64)
    }
}

/// Conditions recorded for one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    pub exact: Option<MatchValue>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Condition {
    /// True if any part of the condition is set
    pub fn is_set(&self) -> bool {
        self.exact.is_some() || self.has_range()
    }

    /// True if either bound is set
    pub fn has_range(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Both bounds, missing ones opened to infinity
    pub fn bounds(&self) -> (f64, f64) {
        (
            self.min.unwrap_or(f64::NEG_INFINITY),
            self.max.unwrap_or(f64::INFINITY),
        )
    }
}

/// Conjunctive filter over one record's fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    schema: &'static RecordSchema,
    /// One slot per descriptor, in table order
    conditions: Vec<Condition>,
    include: bool,
}

macro_rules! text_setters {
    ($($field:ident => $match_fn:ident),* $(,)?) => {
        $(
            #[doc = concat!("Exact match on `", stringify!($field), "`")]
            pub fn $match_fn(&mut self, value: impl Into<String>) -> PlannerResult<&mut Self> {
                self.set_match(stringify!($field), MatchValue::Text(value.into()))
            }
        )*
    };
}

macro_rules! number_setters {
    ($($field:ident => $match_fn:ident, $min_fn:ident, $max_fn:ident);* $(;)?) => {
        $(
            #[doc = concat!("Exact match on `", stringify!($field), "`")]
            pub fn $match_fn(&mut self, value: f64) -> PlannerResult<&mut Self> {
                self.set_match(stringify!($field), MatchValue::Number(value))
            }

            #[doc = concat!("Inclusive lower bound on `", stringify!($field), "`")]
            pub fn $min_fn(&mut self, value: f64) -> PlannerResult<&mut Self> {
                self.set_min(stringify!($field), value)
            }

            #[doc = concat!("Inclusive upper bound on `", stringify!($field), "`")]
            pub fn $max_fn(&mut self, value: f64) -> PlannerResult<&mut Self> {
                self.set_max(stringify!($field), value)
            }
        )*
    };
}

impl Predicate {
    /// Creates an empty predicate over a schema's field table
    pub fn for_schema(schema: &'static RecordSchema) -> Self {
        Self {
            schema,
            conditions: vec![Condition::default(); schema.fields.len()],
            include: true,
        }
    }

    pub fn for_kind(kind: RecordKind) -> Self {
        Self::for_schema(RecordSchema::for_kind(kind))
    }

    /// Empty predicate over Detection fields
    pub fn detection() -> Self {
        Self::for_schema(&DETECTION)
    }

    /// Empty predicate over Segment fields
    pub fn segment() -> Self {
        Self::for_schema(&SEGMENT)
    }

    pub fn schema(&self) -> &'static RecordSchema {
        self.schema
    }

    fn slot(&mut self, field: &str) -> PlannerResult<(&'static FieldDescriptor, &mut Condition)> {
        let schema = self.schema;
        let position = schema
            .position(field)
            .ok_or_else(|| PlannerError::unknown_field(schema.kind.as_str(), field))?;
        Ok((&schema.fields[position], &mut self.conditions[position]))
    }

    /// Records an exact-match target for `field`
    pub fn set_match(&mut self, field: &str, value: impl Into<MatchValue>) -> PlannerResult<&mut Self> {
        let value = value.into();
        let (descriptor, condition) = self.slot(field)?;
        if descriptor.kind != value.kind() {
            return Err(PlannerError::type_mismatch(
                field,
                descriptor.kind.as_str(),
                value.kind().as_str(),
            ));
        }
        condition.exact = Some(value);
        Ok(self)
    }

    /// Records an inclusive lower bound for a numeric `field`
    pub fn set_min(&mut self, field: &str, value: f64) -> PlannerResult<&mut Self> {
        self.range_slot(field)?.min = Some(value);
        Ok(self)
    }

    /// Records an inclusive upper bound for a numeric `field`
    pub fn set_max(&mut self, field: &str, value: f64) -> PlannerResult<&mut Self> {
        self.range_slot(field)?.max = Some(value);
        Ok(self)
    }

    fn range_slot(&mut self, field: &str) -> PlannerResult<&mut Condition> {
        let (descriptor, condition) = self.slot(field)?;
        if !descriptor.range_capable {
            return Err(PlannerError::type_mismatch(
                field,
                "a range-capable number field",
                descriptor.kind.as_str(),
            ));
        }
        Ok(condition)
    }

    /// Removes every condition on `field`
    pub fn clear(&mut self, field: &str) -> PlannerResult<&mut Self> {
        let (_, condition) = self.slot(field)?;
        *condition = Condition::default();
        Ok(self)
    }

    text_setters! {
        value => match_value,
        tag_type => match_tag_type,
        source => match_source,
        model => match_model,
    }

    number_setters! {
        t => match_t, set_min_t, set_max_t;
        t1 => match_t1, set_min_t1, set_max_t1;
        t2 => match_t2, set_min_t2, set_max_t2;
        confidence => match_confidence, set_min_confidence, set_max_confidence;
        fraction => match_fraction, set_min_fraction, set_max_fraction;
    }

    /// `true` returns matches, `false` returns their complement
    pub fn set_include(&mut self, include: bool) -> &mut Self {
        self.include = include;
        self
    }

    /// Inverse of `set_include`
    pub fn set_exclude(&mut self, exclude: bool) -> &mut Self {
        self.include = !exclude;
        self
    }

    pub fn include(&self) -> bool {
        self.include
    }

    /// Condition recorded for `field`, if the field exists
    pub fn condition(&self, field: &str) -> Option<&Condition> {
        self.schema.position(field).map(|i| &self.conditions[i])
    }

    /// Set conditions in field-table order
    pub fn conditions(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &Condition)> + '_ {
        self.schema
            .fields
            .iter()
            .zip(self.conditions.iter())
            .filter(|(_, condition)| condition.is_set())
    }

    /// True if no field condition is set
    pub fn is_empty(&self) -> bool {
        self.conditions.iter().all(|c| !c.is_set())
    }

    /// Applies a `{field: value}` mapping.
    ///
    /// Accepted keys are field names (exact match), `min_<field>` /
    /// `max_<field>` for numeric fields, and `include` / `exclude`. A null
    /// value clears that part of the condition. Keys with no matching
    /// setter are ignored.
    pub fn set(&mut self, mapping: &Map<String, Value>) -> PlannerResult<&mut Self> {
        for (key, value) in mapping {
            match key.as_str() {
                "include" => {
                    if let Some(include) = value.as_bool() {
                        self.set_include(include);
                    }
                }
                "exclude" => {
                    if let Some(exclude) = value.as_bool() {
                        self.set_exclude(exclude);
                    }
                }
                _ => self.apply_entry(key, value)?,
            }
        }
        Ok(self)
    }

    fn apply_entry(&mut self, key: &str, value: &Value) -> PlannerResult<()> {
        if let Some(descriptor) = self.schema.field(key) {
            if value.is_null() {
                if let Some(position) = self.schema.position(key) {
                    self.conditions[position].exact = None;
                }
                return Ok(());
            }
            let target = MatchValue::from_json(value).ok_or_else(|| {
                PlannerError::type_mismatch(key, descriptor.kind.as_str(), json_kind(value))
            })?;
            self.set_match(key, target)?;
            return Ok(());
        }

        let bound = key
            .strip_prefix(MIN_PREFIX)
            .map(|field| (field, true))
            .or_else(|| key.strip_prefix(MAX_PREFIX).map(|field| (field, false)));
        let Some((field, is_min)) = bound else {
            return Ok(());
        };
        if !self.schema.field(field).is_some_and(|d| d.range_capable) {
            return Ok(());
        }

        let condition = self.range_slot(field)?;
        let bound = if value.is_null() {
            None
        } else {
            Some(value.as_f64().ok_or_else(|| {
                PlannerError::type_mismatch(key, "number", json_kind(value))
            })?)
        };
        if is_min {
            condition.min = bound;
        } else {
            condition.max = bound;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_generated_setters() {
        let mut predicate = Predicate::detection();
        predicate.match_value("A").unwrap().set_min_confidence(0.9).unwrap();

        assert_eq!(
            predicate.condition("value").unwrap().exact,
            Some(MatchValue::Text("A".into()))
        );
        assert_eq!(predicate.condition("confidence").unwrap().min, Some(0.9));
        assert_eq!(predicate.condition("confidence").unwrap().bounds(), (0.9, f64::INFINITY));
        assert_eq!(predicate.conditions().count(), 2);
    }

    #[test]
    fn test_field_must_exist_in_schema() {
        let mut predicate = Predicate::detection();
        let err = predicate.match_t1(3.0).unwrap_err();
        assert_eq!(err.code().code(), "FRAMEDEX_UNKNOWN_FIELD");

        let mut predicate = Predicate::segment();
        assert!(predicate.set_min_t1(3.0).is_ok());
        assert!(predicate.match_t(3.0).is_err());
    }

    #[test]
    fn test_kind_checked() {
        let mut predicate = Predicate::detection();
        let err = predicate.set_match("value", 3.0).unwrap_err();
        assert_eq!(err.code().code(), "FRAMEDEX_TYPE_MISMATCH");

        let err = predicate.set_min("value", 1.0).unwrap_err();
        assert_eq!(err.code().code(), "FRAMEDEX_TYPE_MISMATCH");

        assert!(predicate.set_match("confidence", 1i64).is_ok());
    }

    #[test]
    fn test_include_exclude() {
        let mut predicate = Predicate::detection();
        assert!(predicate.include());
        predicate.set_exclude(true);
        assert!(!predicate.include());
        predicate.set_include(true);
        assert!(predicate.include());
    }

    #[test]
    fn test_set_mapping() {
        let mut predicate = Predicate::detection();
        predicate
            .set(&mapping(json!({
                "value": "car",
                "min_confidence": 0.5,
                "max_t": 10,
                "include": false,
                "unknown_field": "ignored",
                "min_value": "ignored",
                "max_nothing": 3
            })))
            .unwrap();

        assert_eq!(predicate.condition("value").unwrap().exact, Some(MatchValue::Text("car".into())));
        assert_eq!(predicate.condition("confidence").unwrap().min, Some(0.5));
        assert_eq!(predicate.condition("t").unwrap().max, Some(10.0));
        assert!(!predicate.include());
        assert_eq!(predicate.conditions().count(), 3);
    }

    #[test]
    fn test_set_mapping_type_mismatch() {
        let mut predicate = Predicate::detection();
        let err = predicate.set(&mapping(json!({"min_confidence": "high"}))).unwrap_err();
        assert_eq!(err.code().code(), "FRAMEDEX_TYPE_MISMATCH");

        let err = predicate.set(&mapping(json!({"value": [1, 2]}))).unwrap_err();
        assert_eq!(err.field(), Some("value"));
    }

    #[test]
    fn test_set_mapping_null_clears() {
        let mut predicate = Predicate::detection();
        predicate.match_value("car").unwrap().set_max_confidence(0.3).unwrap();
        predicate
            .set(&mapping(json!({"value": null, "max_confidence": null})))
            .unwrap();
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut predicate = Predicate::segment();
        predicate.match_t2(4.0).unwrap().set_min_t2(1.0).unwrap();
        predicate.clear("t2").unwrap();
        assert!(predicate.is_empty());
    }
}
