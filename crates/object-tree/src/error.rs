//! Error type shared by every node operation.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed cause chained onto a [`TreeError::PropertyAccess`].
pub type Cause = Box<dyn StdError + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = TreeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TreeError {
    /// Structural mutation attempted on a node without children.
    #[error("{0} does not support children")]
    UnsupportedOperation(String),
    #[error("index {index} must be between 0 and {size}")]
    IndexOutOfRange { index: usize, size: usize },
    /// A replacement value does not fit the element, component or record type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    /// A set kept changing while it was being materialized.
    #[error("unable to get element at {index} because set was continuously updated ({attempts} attempts)")]
    ConcurrentMutation { index: usize, attempts: usize },
    #[error("property {property:?}: {message}")]
    PropertyAccess {
        property: String,
        message: String,
        #[source]
        source: Option<Cause>,
    },
    #[error("node {0} has no parent")]
    NoParent(String),
}

/// Discriminant of a [`TreeError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedOperation,
    IndexOutOfRange,
    TypeMismatch,
    ConcurrentMutation,
    PropertyAccess,
    NoParent,
}

impl TreeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TreeError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            TreeError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            TreeError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            TreeError::ConcurrentMutation { .. } => ErrorKind::ConcurrentMutation,
            TreeError::PropertyAccess { .. } => ErrorKind::PropertyAccess,
            TreeError::NoParent(_) => ErrorKind::NoParent,
        }
    }

    pub fn type_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        TreeError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn property(property: impl Into<String>, message: impl Into<String>) -> Self {
        TreeError::PropertyAccess {
            property: property.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an accessor failure, keeping the original error as the source.
    pub fn property_caused_by(
        property: impl Into<String>,
        message: impl Into<String>,
        cause: impl Into<Cause>,
    ) -> Self {
        TreeError::PropertyAccess {
            property: property.into(),
            message: message.into(),
            source: Some(cause.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TreeError::IndexOutOfRange { index: 3, size: 2 };
        assert_eq!(err.to_string(), "index 3 must be between 0 and 2");

        let err = TreeError::type_mismatch("int", "string");
        assert_eq!(err.to_string(), "type mismatch: expected int, got string");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_property_cause_is_chained() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = TreeError::property_caused_by("array", "getter failed", cause);
        assert_eq!(err.kind(), ErrorKind::PropertyAccess);
        assert_eq!(err.to_string(), "property \"array\": getter failed");
        let source = err.source().expect("cause is kept");
        assert_eq!(source.to_string(), "disk on fire");
    }

    #[test]
    fn test_property_without_cause() {
        let err = TreeError::property("name", "read-only");
        assert!(err.source().is_none());
    }
}
