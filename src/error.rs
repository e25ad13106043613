use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced to the user by the allocator, the session and the stores.
#[derive(Error, Debug)]
pub enum BudgetError {
    /// Total budget is missing, negative or not a number
    #[error("Invalid budget: {0}")]
    InvalidBudget(String),

    /// Percentages do not add up to 100 at save time
    #[error("Allocations must add up to 100% (currently {total}%)")]
    AllocationSum { total: Decimal },

    /// Load or save against the plan store failed
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("No user configured (use --user or TRACKWISE_USER)")]
    MissingUser,
}

impl From<reqwest::Error> for BudgetError {
    fn from(err: reqwest::Error) -> Self {
        BudgetError::Persistence(err.to_string())
    }
}

impl From<rusqlite::Error> for BudgetError {
    fn from(err: rusqlite::Error) -> Self {
        BudgetError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        BudgetError::Persistence(format!("malformed response: {err}"))
    }
}
