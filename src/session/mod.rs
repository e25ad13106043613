//! Viewing/Editing lifecycle of one user's allocation plan.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::allocator;
use crate::error::BudgetError;
use crate::models::{AllocationPlan, Category, PeriodLimits, UserId};
use crate::store::{BudgetStore, SaveMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Read-only display of the last saved plan.
    Viewing,
    /// Live-adjusted draft, possibly not summing to 100.
    Editing,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Viewing => write!(f, "VIEW"),
            Self::Editing => write!(f, "EDIT"),
        }
    }
}

pub struct BudgetSession {
    user: UserId,
    saved: AllocationPlan,
    draft: AllocationPlan,
    mode: Mode,
    /// A plan existed on the last load (or has been saved since).
    has_remote_plan: bool,
}

impl BudgetSession {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            saved: AllocationPlan::empty(),
            draft: AllocationPlan::empty(),
            mode: Mode::Viewing,
            has_remote_plan: false,
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn has_remote_plan(&self) -> bool {
        self.has_remote_plan
    }

    /// The plan currently on screen: the draft while editing, otherwise the
    /// saved plan.
    pub fn plan(&self) -> &AllocationPlan {
        match self.mode {
            Mode::Viewing => &self.saved,
            Mode::Editing => &self.draft,
        }
    }

    pub fn saved_plan(&self) -> &AllocationPlan {
        &self.saved
    }

    pub fn is_dirty(&self) -> bool {
        self.mode == Mode::Editing && self.draft != self.saved
    }

    pub fn is_valid(&self) -> bool {
        allocator::validate_for_save(&self.plan().percentages)
    }

    pub fn limits(&self) -> Result<BTreeMap<Category, PeriodLimits>, BudgetError> {
        let plan = self.plan();
        allocator::compute_derived_limits(plan.total_monthly_budget, &plan.percentages)
    }

    pub fn load(&mut self, store: &dyn BudgetStore) -> Result<(), BudgetError> {
        let loaded = store.load_plan(&self.user)?;
        log::debug!(
            "Loaded plan for {} (existing: {}, total: {})",
            self.user,
            loaded.existed,
            loaded.plan.total_monthly_budget
        );
        self.has_remote_plan = loaded.existed;
        self.saved = loaded.plan.clone();
        self.draft = loaded.plan;
        self.mode = Mode::Viewing;
        Ok(())
    }

    pub fn begin_edit(&mut self) {
        if self.mode == Mode::Viewing {
            self.draft = self.saved.clone();
            self.mode = Mode::Editing;
        }
    }

    /// Rebalance the draft around `category`. Returns the category's
    /// effective (clamped) value.
    pub fn set_percentage(&mut self, category: Category, value: Decimal) -> Decimal {
        self.begin_edit();
        self.draft.percentages =
            allocator::set_category_percentage(&self.draft.percentages, category, value);
        self.draft.percentage(category)
    }

    /// Slider nudge by `step` percentage points.
    pub fn adjust_percentage(&mut self, category: Category, step: Decimal) -> Decimal {
        let current = self.plan().percentage(category);
        self.set_percentage(category, current + step)
    }

    pub fn set_total(&mut self, total: Decimal) -> Result<(), BudgetError> {
        allocator::validate_total(total)?;
        self.begin_edit();
        self.draft.total_monthly_budget = total;
        Ok(())
    }

    /// Throw the draft away and return to the saved plan.
    pub fn discard(&mut self) {
        self.draft = self.saved.clone();
        self.mode = Mode::Viewing;
    }

    /// Persist the plan on screen. Nothing reaches the store unless the total
    /// is positive and the percentages sum to 100. On failure the draft is kept
    /// so the save can be retried.
    pub fn save(&mut self, store: &mut dyn BudgetStore) -> Result<SaveMode, BudgetError> {
        let draft = self.plan().clone();
        allocator::validate_total(draft.total_monthly_budget)?;
        // A zero total carries no split over the wire
        if draft.total_monthly_budget.is_zero() {
            return Err(BudgetError::InvalidBudget("total budget is required".into()));
        }
        if !allocator::validate_for_save(&draft.percentages) {
            return Err(BudgetError::AllocationSum {
                total: draft.percentage_sum(),
            });
        }

        let mode = if self.has_remote_plan {
            SaveMode::Replace
        } else {
            SaveMode::Create
        };

        if let Err(e) = store.save_plan(&self.user, &draft, mode) {
            log::warn!("Saving plan for {} failed: {e}", self.user);
            self.draft = draft;
            self.mode = Mode::Editing;
            return Err(match e {
                BudgetError::Persistence(_) => e,
                other => BudgetError::Persistence(other.to_string()),
            });
        }

        self.saved = draft.clone();
        self.draft = draft;
        self.has_remote_plan = true;
        self.mode = Mode::Viewing;
        Ok(mode)
    }
}
