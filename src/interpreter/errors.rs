//! Runtime error types for the interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to parse errors).
//!
//! Runtime errors never escape a run: the engine records the first one as a
//! terminal `error` step and seals the trace.

use crate::memory::scope::ScopeError;
use crate::parser::ast::SourceLocation;
use crate::snapshot::ErrorKind;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// Read of a name that resolves nowhere
    #[error("ReferenceError: {name} is not defined")]
    NotDefined {
        name: String,
        location: SourceLocation,
    },

    /// Access to a `let`/`const` binding inside its temporal dead zone
    #[error("ReferenceError: Cannot access '{name}' before initialization")]
    Uninitialized {
        name: String,
        location: SourceLocation,
    },

    /// Write to an initialized `const` binding
    #[error("TypeError: Assignment to constant variable '{name}'")]
    ConstAssignment {
        name: String,
        location: SourceLocation,
    },

    /// Calling a non-function, indexing a non-indexable value, and the like
    #[error("TypeError: {message}")]
    TypeError {
        message: String,
        location: SourceLocation,
    },

    /// Call depth exceeded the configured ceiling
    #[error("StackOverflow: Maximum call stack size exceeded ({limit} frames)")]
    StackOverflow {
        limit: usize,
        location: SourceLocation,
    },

    /// Step budget exhausted
    #[error("Execution limit exceeded ({limit} steps)")]
    ExecutionLimitExceeded {
        limit: usize,
        location: SourceLocation,
    },
}

impl RuntimeError {
    pub fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
            location,
        }
    }

    /// Attach a source location to a scope-level failure
    pub fn from_scope(err: ScopeError, location: SourceLocation) -> Self {
        match err {
            ScopeError::NotDefined { name } => RuntimeError::NotDefined { name, location },
            ScopeError::TemporalDeadZone { name } => RuntimeError::Uninitialized { name, location },
            ScopeError::ConstAssignment { name } => RuntimeError::ConstAssignment { name, location },
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            RuntimeError::NotDefined { location, .. }
            | RuntimeError::Uninitialized { location, .. }
            | RuntimeError::ConstAssignment { location, .. }
            | RuntimeError::TypeError { location, .. }
            | RuntimeError::StackOverflow { location, .. }
            | RuntimeError::ExecutionLimitExceeded { location, .. } => *location,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::NotDefined { .. } | RuntimeError::Uninitialized { .. } => {
                ErrorKind::ReferenceError
            }
            RuntimeError::ConstAssignment { .. } | RuntimeError::TypeError { .. } => {
                ErrorKind::TypeError
            }
            RuntimeError::StackOverflow { .. } => ErrorKind::StackOverflow,
            RuntimeError::ExecutionLimitExceeded { .. } => ErrorKind::ExecutionLimitExceeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let loc = SourceLocation::new(3, 1);
        let err = RuntimeError::NotDefined {
            name: "x".to_string(),
            location: loc,
        };
        assert_eq!(err.to_string(), "ReferenceError: x is not defined");
        assert_eq!(err.kind(), ErrorKind::ReferenceError);
        assert_eq!(err.location(), loc);

        let err = RuntimeError::ExecutionLimitExceeded {
            limit: 10,
            location: loc,
        };
        assert_eq!(err.to_string(), "Execution limit exceeded (10 steps)");
    }

    #[test]
    fn test_from_scope_error() {
        let err = RuntimeError::from_scope(
            ScopeError::TemporalDeadZone {
                name: "y".to_string(),
            },
            SourceLocation::new(1, 13),
        );
        assert_eq!(err.kind(), ErrorKind::ReferenceError);
        assert_eq!(
            err.to_string(),
            "ReferenceError: Cannot access 'y' before initialization"
        );
    }
}
