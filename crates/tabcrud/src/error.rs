//! Error types for tabcrud

use thiserror::Error;

/// Result type alias for tabcrud operations
pub type CrudResult<T> = Result<T, CrudError>;

/// Error types for clause compilation and statement execution.
///
/// The first five variants are raised while parsing request descriptors or
/// compiling clauses. They carry the 1-based index of the offending WHERE
/// entry when one applies. The remaining variants come from the executor.
#[derive(Debug, Error)]
pub enum CrudError {
    /// Missing or mistyped field in a request payload
    #[error("Structural error{}: {message}", at_entry(.entry))]
    Structural {
        entry: Option<usize>,
        message: String,
    },

    /// Operator is not one of `equals`, `in`, `range`
    #[error(
        "Unknown operator{}: '{operator}' (expected 'equals', 'in', or 'range')",
        at_entry(.entry)
    )]
    UnknownOperator {
        entry: Option<usize>,
        operator: String,
    },

    /// Wrong number of values for an operator, or of parameter names for a clause
    #[error("Arity mismatch{}: {context} expects {expected} but got {got}", at_entry(.entry))]
    ArityMismatch {
        entry: Option<usize>,
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// Range clause with neither a lower nor an upper bound
    #[error("Range bounds missing{}: range on '{field}' needs a min or a max", at_entry(.entry))]
    RangeBoundsMissing { entry: Option<usize>, field: String },

    /// Parameter name the target driver cannot express
    #[error(
        "Invalid parameter name '{0}': must start with a letter and contain only letters and digits"
    )]
    InvalidParamName(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Statement timeout error
    #[error("Statement timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

fn at_entry(entry: &Option<usize>) -> String {
    match entry {
        Some(n) => format!(" in where clause {n}"),
        None => String::new(),
    }
}

impl CrudError {
    /// Create a structural error not tied to a WHERE entry
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            entry: None,
            message: message.into(),
        }
    }

    /// Create a structural error for the given 1-based WHERE entry
    pub fn structural_at(entry: usize, message: impl Into<String>) -> Self {
        Self::Structural {
            entry: Some(entry),
            message: message.into(),
        }
    }

    /// Create an arity mismatch error
    pub fn arity(context: &'static str, expected: usize, got: usize) -> Self {
        Self::ArityMismatch {
            entry: None,
            context,
            expected,
            got,
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Attach a 1-based WHERE entry index, keeping one that is already set.
    pub fn at(mut self, index: usize) -> Self {
        match &mut self {
            Self::Structural { entry, .. }
            | Self::UnknownOperator { entry, .. }
            | Self::ArityMismatch { entry, .. }
            | Self::RangeBoundsMissing { entry, .. } => {
                entry.get_or_insert(index);
            }
            _ => {}
        }
        self
    }

    /// The 1-based WHERE entry this error refers to, if any.
    pub fn entry(&self) -> Option<usize> {
        match self {
            Self::Structural { entry, .. }
            | Self::UnknownOperator { entry, .. }
            | Self::ArityMismatch { entry, .. }
            | Self::RangeBoundsMissing { entry, .. } => *entry,
            _ => None,
        }
    }

    /// Check if this error was raised while validating or compiling a request
    /// (as opposed to executing it).
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::Structural { .. }
                | Self::UnknownOperator { .. }
                | Self::ArityMismatch { .. }
                | Self::RangeBoundsMissing { .. }
                | Self::InvalidParamName(_)
        )
    }

    /// Check if this is an arity mismatch error
    pub fn is_arity_mismatch(&self) -> bool {
        matches!(self, Self::ArityMismatch { .. })
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this is an unknown operator error
    pub fn is_unknown_operator(&self) -> bool {
        matches!(self, Self::UnknownOperator { .. })
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for CrudError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_entry_index() {
        let err = CrudError::structural_at(3, "missing 'field'");
        assert_eq!(
            err.to_string(),
            "Structural error in where clause 3: missing 'field'"
        );
    }

    #[test]
    fn at_keeps_existing_entry() {
        let err = CrudError::structural_at(2, "x").at(5);
        assert_eq!(err.entry(), Some(2));

        let err = CrudError::arity("equals", 1, 2).at(4);
        assert_eq!(err.entry(), Some(4));
        assert_eq!(
            err.to_string(),
            "Arity mismatch in where clause 4: equals expects 1 but got 2"
        );
    }

    #[test]
    fn invalid_param_name_has_no_entry() {
        let err = CrudError::InvalidParamName("p_1".into()).at(1);
        assert_eq!(err.entry(), None);
        assert!(err.is_request_error());
    }
}
