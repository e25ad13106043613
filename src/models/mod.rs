mod category;
mod expense;
mod plan;
mod user;

pub use category::Category;
pub use expense::Expense;
pub use plan::{AllocationPlan, Percentages, PeriodLimits};
pub use user::UserId;
