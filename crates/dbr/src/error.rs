//! Error types for dbr

use crate::dml::StatementKind;
use thiserror::Error;

/// Result type alias for dbr operations
pub type DbrResult<T> = Result<T, DbrError>;

/// Errors produced while building, serializing or executing a statement.
///
/// Every failure is returned as a value; a statement that fails never hands
/// back partially built SQL text or a partial argument list.
#[derive(Debug, Error)]
pub enum DbrError {
    /// The statement is incomplete (missing table, empty column list, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The number of `?` placeholders does not match the number of arguments.
    #[error("Argument count mismatch: {placeholders} placeholders, {args} arguments")]
    ArgumentCountMismatch { placeholders: usize, args: usize },

    /// An assembler could not provide a value for a requested column.
    #[error("{kind}: column '{column}' not found")]
    UnresolvedColumn { kind: StatementKind, column: String },

    /// An assembler provided a value for a column nobody asked for.
    #[error("{kind}: column '{column}' was not requested")]
    UnexpectedColumn { kind: StatementKind, column: String },

    /// A list argument has the wrong number of elements for its operator.
    #[error("Malformed slice argument: {0}")]
    MalformedSliceArgument(String),

    /// A value cannot be rendered as a SQL literal.
    #[error("Interpolation error: {0}")]
    Interpolation(String),

    /// A listener aborted serialization.
    #[error("Aborted by listener: {0}")]
    Aborted(String),

    /// Error reported by an external executor.
    #[error("Executor error: {0}")]
    Executor(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbrError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a malformed slice argument error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSliceArgument(message.into())
    }

    /// Create an interpolation error
    pub fn interpolation(message: impl Into<String>) -> Self {
        Self::Interpolation(message.into())
    }

    /// Create an executor error
    pub fn executor(message: impl Into<String>) -> Self {
        Self::Executor(message.into())
    }

    /// Create the "column not found" error an [`Assembler`](crate::Assembler)
    /// returns for a column it cannot resolve.
    pub fn unresolved_column(kind: StatementKind, column: impl Into<String>) -> Self {
        Self::UnresolvedColumn {
            kind,
            column: column.into(),
        }
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is an argument count mismatch
    pub fn is_argument_count_mismatch(&self) -> bool {
        matches!(self, Self::ArgumentCountMismatch { .. })
    }

    /// Check if this is an unresolved assembler column
    pub fn is_unresolved_column(&self) -> bool {
        matches!(self, Self::UnresolvedColumn { .. })
    }

    /// Check if this is a malformed slice argument
    pub fn is_malformed_slice(&self) -> bool {
        matches!(self, Self::MalformedSliceArgument(_))
    }

    /// Check if this is an interpolation error
    pub fn is_interpolation(&self) -> bool {
        matches!(self, Self::Interpolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_column() {
        let err = DbrError::unresolved_column(StatementKind::Update, "email");
        assert_eq!(err.to_string(), "UPDATE: column 'email' not found");
        assert!(err.is_unresolved_column());
    }

    #[test]
    fn display_argument_count_mismatch() {
        let err = DbrError::ArgumentCountMismatch {
            placeholders: 3,
            args: 2,
        };
        assert_eq!(
            err.to_string(),
            "Argument count mismatch: 3 placeholders, 2 arguments"
        );
        assert!(err.is_argument_count_mismatch());
    }
}
