//! Planner error types
//!
//! Raised while building predicates and compound queries, before anything
//! is evaluated.
//!
//! Error codes:
//! - FRAMEDEX_UNKNOWN_FIELD (REJECT)
//! - FRAMEDEX_TYPE_MISMATCH (REJECT)
//! - FRAMEDEX_INVALID_OPERATION (REJECT)
//! - FRAMEDEX_MALFORMED_QUERY (REJECT)

use std::fmt;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Field is not part of the predicate's schema
    FramedexUnknownField,
    /// Value kind does not match the field kind
    FramedexTypeMismatch,
    /// Combinator other than AND / OR
    FramedexInvalidOperation,
    /// Declarative query is neither a predicate nor a compound query
    FramedexMalformedQuery,
}

impl PlannerErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::FramedexUnknownField => "FRAMEDEX_UNKNOWN_FIELD",
            PlannerErrorCode::FramedexTypeMismatch => "FRAMEDEX_TYPE_MISMATCH",
            PlannerErrorCode::FramedexInvalidOperation => "FRAMEDEX_INVALID_OPERATION",
            PlannerErrorCode::FramedexMalformedQuery => "FRAMEDEX_MALFORMED_QUERY",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerError {
    code: PlannerErrorCode,
    message: String,
    field: Option<String>,
}

impl PlannerError {
    /// Field does not exist in the schema
    pub fn unknown_field(schema: &str, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            code: PlannerErrorCode::FramedexUnknownField,
            message: format!("Field '{}' is not part of the {} schema", field, schema),
            field: Some(field),
        }
    }

    /// Value kind does not fit the field
    pub fn type_mismatch(field: impl Into<String>, expected: &str, actual: &str) -> Self {
        let field = field.into();
        Self {
            code: PlannerErrorCode::FramedexTypeMismatch,
            message: format!("Field '{}' expects {}, got {}", field, expected, actual),
            field: Some(field),
        }
    }

    /// Combinator is neither AND nor OR
    pub fn invalid_operation(operation: &str) -> Self {
        Self {
            code: PlannerErrorCode::FramedexInvalidOperation,
            message: format!("Operation '{}' is not AND or OR", operation),
            field: None,
        }
    }

    /// Declarative query could not be interpreted
    pub fn malformed_query(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::FramedexMalformedQuery,
            message: reason.into(),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending field if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
