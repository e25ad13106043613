//! Plan persistence. The session only talks to [`BudgetStore`]; the HTTP
//! API and the local SQLite database are interchangeable behind it.

mod http;
mod local;
mod schema;
mod wire;

pub use http::HttpStore;
pub use local::SqliteStore;

use crate::error::BudgetError;
use crate::models::{AllocationPlan, Expense, UserId};

/// Whether a save creates the user's first plan or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Replace,
}

/// Result of loading a plan. `existed` is false when the store had nothing
/// for the user and `plan` is the empty default.
#[derive(Debug, Clone)]
pub struct LoadedPlan {
    pub plan: AllocationPlan,
    pub existed: bool,
}

impl LoadedPlan {
    pub fn missing() -> Self {
        Self {
            plan: AllocationPlan::empty(),
            existed: false,
        }
    }
}

pub trait BudgetStore {
    /// Fetch the user's plan, or the empty default when none exists.
    fn load_plan(&self, user: &UserId) -> Result<LoadedPlan, BudgetError>;

    /// Create or replace the user's plan.
    fn save_plan(
        &mut self,
        user: &UserId,
        plan: &AllocationPlan,
        mode: SaveMode,
    ) -> Result<(), BudgetError>;

    /// Expenses recorded by the user.
    fn load_expenses(&self, user: &UserId) -> Result<Vec<Expense>, BudgetError>;

    /// Short label shown in the status bar and CLI output.
    fn describe(&self) -> String;
}
