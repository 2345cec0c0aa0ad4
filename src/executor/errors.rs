//! Executor error types
//!
//! Error codes:
//! - FRAMEDEX_UNKNOWN_VALUE (ERROR)
//! - FRAMEDEX_MALFORMED_QUERY (REJECT)
//! - FRAMEDEX_INVALID_QUERY (REJECT)
//!
//! An unknown value is distinct from an empty match: the queried text never
//! occurred at that field path when the index was built.

use std::fmt;

use crate::planner::{PlannerError, PlannerErrorCode};

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query refused before evaluation
    Reject,
    /// Evaluation stopped
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Exact text match on a field/value pair absent from the index
    FramedexUnknownValue,
    /// Query tree rejected at the evaluator boundary
    FramedexMalformedQuery,
    /// Declarative query failed to build
    FramedexInvalidQuery,
}

impl ExecutorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::FramedexUnknownValue => "FRAMEDEX_UNKNOWN_VALUE",
            ExecutorErrorCode::FramedexMalformedQuery => "FRAMEDEX_MALFORMED_QUERY",
            ExecutorErrorCode::FramedexInvalidQuery => "FRAMEDEX_INVALID_QUERY",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ExecutorErrorCode::FramedexUnknownValue => Severity::Error,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug)]
pub struct ExecutorError {
    code: ExecutorErrorCode,
    message: String,
    field: Option<String>,
    value: Option<String>,
}

impl ExecutorError {
    /// Text value never seen at `field` when the index was built
    pub fn unknown_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        Self {
            code: ExecutorErrorCode::FramedexUnknownValue,
            message: format!("Value '{}' does not exist in the index for field '{}'", value, field),
            field: Some(field),
            value: Some(value),
        }
    }

    /// Query tree refused before evaluation
    pub fn malformed_query(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::FramedexMalformedQuery,
            message: reason.into(),
            field: None,
            value: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Field path involved, if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Queried value, if applicable
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// True for the unknown field/value lookup condition
    pub fn is_unknown_value(&self) -> bool {
        self.code == ExecutorErrorCode::FramedexUnknownValue
    }
}

impl From<PlannerError> for ExecutorError {
    fn from(err: PlannerError) -> Self {
        let code = match err.code() {
            PlannerErrorCode::FramedexMalformedQuery => ExecutorErrorCode::FramedexMalformedQuery,
            _ => ExecutorErrorCode::FramedexInvalidQuery,
        };
        Self {
            code,
            message: err.to_string(),
            field: err.field().map(str::to_string),
            value: None,
        }
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for ExecutorError {}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
