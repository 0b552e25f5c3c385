//! Error types for polysql

use crate::dialect::Dialect;
use thiserror::Error;

/// Result type alias for polysql operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while building, rendering or executing statements.
#[derive(Debug, Error)]
pub enum SqlError {
    /// A condition string or shorthand key that cannot be classified
    #[error("Malformed expression '{input}': {message}")]
    MalformedExpression { input: String, message: String },

    /// A predicate built with the wrong number of operands for its operator
    #[error("{operator} expects {expected} operand(s), got {got}")]
    ArityMismatch {
        operator: &'static str,
        expected: &'static str,
        got: usize,
    },

    /// A nested predicate set merged without a conjunction
    #[error("Nested predicate set has no conjunction")]
    UnboundConjunction,

    /// The requested construct cannot be expressed in the target dialect
    #[error("{dialect} does not support this statement: {message}")]
    DialectConstraintViolation { dialect: Dialect, message: String },

    /// A FROM/JOIN alias map that does not hold exactly one entry
    #[error("Table alias map must hold exactly one entry, got {0}")]
    InvalidTableShape(usize),

    /// Identifier that cannot be quoted safely
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Rendering a container that has no active statement
    #[error("No active statement to render")]
    EmptyStatement,

    /// Transaction state error
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[cfg(feature = "postgres")]
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SqlError {
    /// Create a malformed expression error
    pub fn malformed(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedExpression {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a dialect constraint violation
    pub fn unsupported(dialect: Dialect, message: impl Into<String>) -> Self {
        Self::DialectConstraintViolation {
            dialect,
            message: message.into(),
        }
    }

    /// Create a transaction state error
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction(message.into())
    }

    /// Check if this is a render/construction error (as opposed to a database error).
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedExpression { .. }
                | Self::ArityMismatch { .. }
                | Self::UnboundConjunction
                | Self::DialectConstraintViolation { .. }
                | Self::InvalidTableShape(_)
                | Self::InvalidIdentifier(_)
                | Self::EmptyStatement
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = SqlError::malformed("age >>= 1", "unknown operator");
        assert_eq!(
            err.to_string(),
            "Malformed expression 'age >>= 1': unknown operator"
        );

        let err = SqlError::unsupported(Dialect::SqlServer, "paging requires ORDER BY");
        assert_eq!(
            err.to_string(),
            "SQL Server does not support this statement: paging requires ORDER BY"
        );
    }

    #[test]
    fn build_errors_are_classified() {
        assert!(SqlError::UnboundConjunction.is_build_error());
        assert!(SqlError::InvalidTableShape(2).is_build_error());
        assert!(!SqlError::transaction("no active transaction").is_build_error());
        assert!(!SqlError::Connection("reset".into()).is_build_error());
    }
}
