//! Spending against monthly limits, per category.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::allocator::HUNDRED;
use crate::models::{Category, Expense, PeriodLimits, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    Freeze,
    Reduce,
    Monitor,
    Safe,
}

impl Advice {
    /// Tier for a spent-to-limit percentage.
    pub fn for_percent(spent_percent: Decimal) -> Self {
        if spent_percent > HUNDRED {
            Self::Freeze
        } else if spent_percent > Decimal::from(75) {
            Self::Reduce
        } else if spent_percent > Decimal::from(50) {
            Self::Monitor
        } else {
            Self::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freeze => "Immediate spending freeze needed",
            Self::Reduce => "Consider reducing expenses",
            Self::Monitor => "Monitor spending closely",
            Self::Safe => "Within safe limits",
        }
    }
}

impl std::fmt::Display for Advice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct CategoryInsight {
    pub category: Category,
    pub spent: Decimal,
    pub limit: Decimal,
    /// `None` when the category has no limit.
    pub spent_percent: Option<Decimal>,
    pub count: usize,
    pub advice: Advice,
}

impl CategoryInsight {
    /// Share of the limit used, capped at 1.0, for progress bars.
    pub fn ratio(&self) -> f64 {
        match self.spent_percent {
            Some(pct) => (pct / HUNDRED).to_f64().unwrap_or(0.0).clamp(0.0, 1.0),
            None if self.spent > Decimal::ZERO => 1.0,
            None => 0.0,
        }
    }
}

/// Group `user`'s expenses by category and compare each total to the
/// category's monthly limit. `month` ("YYYY-MM") keeps only expenses dated
/// in that month; undated expenses are dropped when a month is given.
///
/// Sorted by spent percentage, highest first.
pub fn summarize(
    expenses: &[Expense],
    limits: &BTreeMap<Category, PeriodLimits>,
    user: &UserId,
    month: Option<&str>,
) -> Vec<CategoryInsight> {
    let mut grouped: BTreeMap<Category, (Decimal, usize)> = BTreeMap::new();
    for expense in expenses
        .iter()
        .filter(|e| e.email.is_empty() || e.email == user.as_str())
        .filter(|e| month.is_none() || e.month().as_deref() == month)
    {
        let entry = grouped
            .entry(expense.category)
            .or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(expense.amount);
        entry.1 += 1;
    }

    let mut insights: Vec<CategoryInsight> = grouped
        .into_iter()
        .map(|(category, (spent, count))| {
            let limit = limits
                .get(&category)
                .map(|l| l.monthly)
                .unwrap_or(Decimal::ZERO);
            // Ratios too large to represent are capped at Decimal::MAX
            let spent_percent = (limit > Decimal::ZERO).then(|| {
                spent
                    .checked_div(limit)
                    .and_then(|ratio| ratio.checked_mul(HUNDRED))
                    .unwrap_or(Decimal::MAX)
            });
            // Spending with no limit behind it is treated as over budget
            let advice = match spent_percent {
                Some(pct) => Advice::for_percent(pct),
                None if spent > Decimal::ZERO => Advice::Freeze,
                None => Advice::Safe,
            };
            CategoryInsight {
                category,
                spent,
                limit,
                spent_percent,
                count,
                advice,
            }
        })
        .collect();

    insights.sort_by(|a, b| {
        sort_key(b)
            .cmp(&sort_key(a))
            .then(a.category.cmp(&b.category))
    });
    insights
}

/// Unlimited spending sorts above any percentage.
fn sort_key(insight: &CategoryInsight) -> (bool, Decimal) {
    match insight.spent_percent {
        Some(pct) => (false, pct),
        None => (insight.spent > Decimal::ZERO, Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests;
