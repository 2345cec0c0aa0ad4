//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events in framedex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded from text or file
    ConfigLoaded,
    /// Numeric backend chosen for a collection
    BackendSelected,

    // Index operations
    /// Index build failed; previous snapshot kept
    IndexBuildFailed,

    // Query operations
    /// Query evaluated
    QueryExecuted,
    /// Query refused or failed
    QueryRejected,
    /// Group query evaluated
    GroupQueryExecuted,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::BackendSelected => "BACKEND_SELECTED",
            Event::IndexBuildFailed => "INDEX_BUILD_FAILED",
            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::GroupQueryExecuted => "GROUP_QUERY_COMPLETE",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::IndexBuildFailed | Event::QueryRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
