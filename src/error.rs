use thiserror::Error;

/// Errors returned by the amortization engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmortizationError {
    #[error("Invalid input: {field} ({reason})")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Decimal overflow while computing {context}")]
    Overflow { context: &'static str },
}

impl AmortizationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        AmortizationError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
