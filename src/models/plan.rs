use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::Category;

pub type Percentages = BTreeMap<Category, Decimal>;

/// Total monthly budget plus its per-category percentage split.
///
/// Period amounts are always derived from these two fields, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    pub total_monthly_budget: Decimal,
    pub percentages: Percentages,
}

impl AllocationPlan {
    /// Every category at 0% and a zero total.
    pub fn empty() -> Self {
        Self {
            total_monthly_budget: Decimal::ZERO,
            percentages: Category::all()
                .iter()
                .map(|c| (*c, Decimal::ZERO))
                .collect(),
        }
    }

    pub fn new(total_monthly_budget: Decimal, percentages: Percentages) -> Self {
        let mut plan = Self::empty();
        plan.total_monthly_budget = total_monthly_budget;
        plan.percentages.extend(percentages);
        plan
    }

    pub fn percentage(&self, category: Category) -> Decimal {
        self.percentages
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn percentage_sum(&self) -> Decimal {
        self.percentages.values().copied().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_monthly_budget.is_zero() && self.percentages.values().all(|p| p.is_zero())
    }
}

impl Default for AllocationPlan {
    fn default() -> Self {
        Self::empty()
    }
}

/// Spending limits of one category for each period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodLimits {
    pub monthly: Decimal,
    pub daily: Decimal,
    pub weekly: Decimal,
}
