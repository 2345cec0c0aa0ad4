//! Annotation record types
//!
//! Two record kinds are produced by upstream annotators:
//! - Detection: something observed at a single instant `t`
//! - Segment: something observed over an interval `t1..=t2`
//!
//! Both share the default field set (value, tag_type, source, model,
//! confidence, fraction) and may carry a region and the frame footprint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult, ViolationDetails};
use super::record::Record;

/// A point in normalized frame coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding quadrilateral, always exactly four points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contour(pub [Point; 4]);

impl Contour {
    /// Axis-aligned box from its top-left and bottom-right corners.
    ///
    /// Points run clockwise from the top-left corner.
    pub fn from_box(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Contour([
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ])
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.0
    }
}

/// Pixel size of the frame a region was found on
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f64,
    pub height: f64,
}

/// A located area of the frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub contour: Contour,
    /// Share of the frame covered by the contour
    pub fraction: f64,
}

/// Record kinds known to the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Detection,
    Segment,
}

impl RecordKind {
    /// Returns the kind's name as used in declarative queries
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Detection => "detection",
            RecordKind::Segment => "segment",
        }
    }

    /// Parses a kind name (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "detection" => Some(RecordKind::Detection),
            "segment" => Some(RecordKind::Segment),
            _ => None,
        }
    }
}

/// A point-in-time annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub t: f64,
    pub value: String,
    pub tag_type: String,
    pub source: String,
    pub model: String,
    pub confidence: f64,
    pub fraction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<Footprint>,
}

impl Default for Detection {
    fn default() -> Self {
        Self {
            t: 0.0,
            value: String::new(),
            tag_type: "tag".to_string(),
            source: String::new(),
            model: String::new(),
            confidence: 1.0,
            fraction: 1.0,
            region: None,
            footprint: None,
        }
    }
}

impl Detection {
    /// Creates a detection of `value` at instant `t`
    pub fn new(t: f64, value: impl Into<String>) -> Self {
        Self {
            t,
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_tag_type(mut self, tag_type: impl Into<String>) -> Self {
        self.tag_type = tag_type.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Attaches a region; the record's `fraction` follows the region's
    pub fn with_region(mut self, region: Region) -> Self {
        self.fraction = region.fraction;
        self.region = Some(region);
        self
    }

    pub fn with_footprint(mut self, width: f64, height: f64) -> Self {
        self.footprint = Some(Footprint { width, height });
        self
    }

    /// Checks value domains
    pub fn validate(&self) -> SchemaResult<()> {
        check_unit_range("confidence", self.confidence)?;
        check_unit_range("fraction", self.fraction)?;
        if let Some(region) = &self.region {
            check_unit_range("region.fraction", region.fraction)?;
        }
        Ok(())
    }

    /// Converts into an open record
    pub fn into_record(self) -> Record {
        to_record(&self)
    }
}

/// A time-ranged annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub t1: f64,
    pub t2: f64,
    pub value: String,
    pub tag_type: String,
    pub source: String,
    pub model: String,
    pub confidence: f64,
    pub fraction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<Footprint>,
}

impl Default for Segment {
    fn default() -> Self {
        Self {
            t1: 0.0,
            t2: 0.0,
            value: String::new(),
            tag_type: "tag".to_string(),
            source: String::new(),
            model: String::new(),
            confidence: 1.0,
            fraction: 1.0,
            region: None,
            footprint: None,
        }
    }
}

impl Segment {
    /// Creates a segment of `value` spanning `t1..=t2`
    pub fn new(t1: f64, t2: f64, value: impl Into<String>) -> Self {
        Self {
            t1,
            t2,
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_tag_type(mut self, tag_type: impl Into<String>) -> Self {
        self.tag_type = tag_type.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.fraction = region.fraction;
        self.region = Some(region);
        self
    }

    pub fn with_footprint(mut self, width: f64, height: f64) -> Self {
        self.footprint = Some(Footprint { width, height });
        self
    }

    /// Duration of the interval
    pub fn duration(&self) -> f64 {
        self.t2 - self.t1
    }

    /// Checks value domains and interval ordering
    pub fn validate(&self) -> SchemaResult<()> {
        if self.t1 > self.t2 {
            return Err(SchemaError::violation(ViolationDetails::new(
                "t1",
                format!("t1 <= t2 ({})", self.t2),
                self.t1.to_string(),
            )));
        }
        check_unit_range("confidence", self.confidence)?;
        check_unit_range("fraction", self.fraction)?;
        if let Some(region) = &self.region {
            check_unit_range("region.fraction", region.fraction)?;
        }
        Ok(())
    }

    /// Converts into an open record
    pub fn into_record(self) -> Record {
        to_record(&self)
    }
}

impl From<Detection> for Record {
    fn from(detection: Detection) -> Self {
        detection.into_record()
    }
}

impl From<Segment> for Record {
    fn from(segment: Segment) -> Self {
        segment.into_record()
    }
}

fn check_unit_range(field: &str, value: f64) -> SchemaResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SchemaError::violation(ViolationDetails::out_of_unit_range(field, value)))
    }
}

fn to_record<T: Serialize>(value: &T) -> Record {
    // Plain structs of strings and finite-or-not floats always serialize to an object.
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Record::from(fields),
        _ => Record::new(),
    }
}
