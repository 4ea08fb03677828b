//! # Ledger Error Types Module
//!
//! This module defines the closed error taxonomy used throughout the ledger core.
//! Every variant carries a stable machine-readable code so programmatic callers
//! can branch on the error kind instead of string-matching messages.

/// Custom error types for ledger operations
#[derive(Debug, Clone)]
pub enum LedgerError {
    /// A required field is missing, malformed, or not strictly positive
    Validation { field: String, reason: String },
    /// Unit price requested with a non-positive quantity
    DivisionByZero(String),
    /// Suggested price requested with a target margin fraction >= 1
    InvalidMargin(f64),
    /// A recipe line references an ingredient that cannot be resolved
    IngredientNotFound(String),
    /// Read or write to the backing store failed
    Persistence(String),
    /// The command pipeline exceeded its deadline before writing
    Timeout(String),
}

impl LedgerError {
    /// Stable code attached alongside every localized message
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation { .. } => "VALIDATION",
            LedgerError::DivisionByZero(_) => "DIVISION_BY_ZERO",
            LedgerError::InvalidMargin(_) => "INVALID_MARGIN",
            LedgerError::IngredientNotFound(_) => "INGREDIENT_NOT_FOUND",
            LedgerError::Persistence(_) => "PERSISTENCE_FAILURE",
            LedgerError::Timeout(_) => "TIMEOUT",
        }
    }
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Validation { field, reason } => {
                write!(f, "Validation error on '{field}': {reason}")
            }
            LedgerError::DivisionByZero(ctx) => write!(f, "Division by zero: {ctx}"),
            LedgerError::InvalidMargin(m) => write!(f, "Invalid margin fraction: {m}"),
            LedgerError::IngredientNotFound(name) => write!(f, "Ingredient not found: {name}"),
            LedgerError::Persistence(msg) => write!(f, "Persistence failure: {msg}"),
            LedgerError::Timeout(msg) => write!(f, "Timeout: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}

impl From<anyhow::Error> for LedgerError {
    fn from(err: anyhow::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}
