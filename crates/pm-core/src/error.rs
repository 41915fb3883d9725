//! Error types for pidmass

use thiserror::Error;

/// pidmass error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Validation error (bad configuration or malformed input table)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A stage needed a column the input table does not carry
    #[error("missing column '{name}'")]
    MissingColumn {
        /// Column name as configured.
        name: String,
    },

    /// Input violates a documented precondition (e.g. unsorted event ids)
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

impl Error {
    /// Shorthand for [`Error::MissingColumn`].
    pub fn missing_column(name: impl Into<String>) -> Self {
        Error::MissingColumn { name: name.into() }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_names_the_column() {
        let err = Error::missing_column("prob_k");
        assert_eq!(err.to_string(), "missing column 'prob_k'");
    }

    #[test]
    fn io_error_converts() {
        fn open() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(open(), Err(Error::Io(_))));
    }
}
