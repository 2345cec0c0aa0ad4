//! Schema error types
//!
//! Error codes:
//! - FRAMEDEX_NOT_AN_OBJECT (REJECT)
//! - FRAMEDEX_SCHEMA_VIOLATION (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Input rejected, nothing was changed
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// A raw record was not a JSON object
    FramedexNotAnObject,
    /// A record value is outside its allowed domain
    FramedexSchemaViolation,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::FramedexNotAnObject => "FRAMEDEX_NOT_AN_OBJECT",
            SchemaErrorCode::FramedexSchemaViolation => "FRAMEDEX_SCHEMA_VIOLATION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Violation details
#[derive(Debug, Clone, PartialEq)]
pub struct ViolationDetails {
    /// Field path (e.g., "region.fraction")
    pub field: String,
    /// Expected condition
    pub expected: String,
    /// Actual value found
    pub actual: String,
}

impl ViolationDetails {
    pub fn new(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn out_of_unit_range(field: impl Into<String>, actual: f64) -> Self {
        Self::new(field, "value in [0, 1]", actual.to_string())
    }
}

impl fmt::Display for ViolationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    details: Option<ViolationDetails>,
}

impl SchemaError {
    /// A raw record was some JSON value other than an object
    pub fn not_an_object(kind: &str) -> Self {
        Self {
            code: SchemaErrorCode::FramedexNotAnObject,
            message: format!("Record must be a JSON object, got {}", kind),
            details: None,
        }
    }

    /// A field holds a value outside its domain
    pub fn violation(details: ViolationDetails) -> Self {
        Self {
            code: SchemaErrorCode::FramedexSchemaViolation,
            message: details.to_string(),
            details: Some(details),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns violation details if available
    pub fn details(&self) -> Option<&ViolationDetails> {
        self.details.as_ref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
