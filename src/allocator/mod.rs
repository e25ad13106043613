//! Percentage rebalancing and per-period limit derivation.
//!
//! All functions are pure: they take a plan's parts and return new values.

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::BudgetError;
use crate::models::{Category, Percentages, PeriodLimits};

pub(crate) const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
const DAYS_PER_MONTH: Decimal = Decimal::from_parts(30, 0, 0, false, 0);
/// 4.345 weeks per month.
const WEEKS_PER_MONTH: Decimal = Decimal::from_parts(4345, 0, 0, false, 3);
/// ±0.01 percentage points.
const SUM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Set one category to `requested` (clamped to 0..=100) and rescale every
/// other category proportionally so the total stays at 100.
///
/// When all other categories are already zero they stay at zero and the
/// total is left at the edited value.
pub fn set_category_percentage(
    percentages: &Percentages,
    category: Category,
    requested: Decimal,
) -> Percentages {
    let effective = requested.clamp(Decimal::ZERO, HUNDRED);
    let current = percentages.get(&category).copied().unwrap_or(Decimal::ZERO);
    if effective == current {
        return percentages.clone();
    }

    let others_before: Decimal = percentages
        .iter()
        .filter(|(c, _)| **c != category)
        .map(|(_, p)| *p)
        .sum();
    let remaining = HUNDRED - effective;

    let mut updated = percentages.clone();
    updated.insert(category, effective);

    if others_before.is_zero() {
        for (c, p) in updated.iter_mut() {
            if *c != category {
                *p = Decimal::ZERO;
            }
        }
        return updated;
    }

    let scale = remaining / others_before;
    for (c, p) in updated.iter_mut() {
        if *c != category {
            *p = round_percent(*p * scale);
        }
    }

    absorb_residual(&mut updated, Some(category));
    updated
}

/// Two decimal places, halves rounded away from zero.
pub(crate) fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Push the rounding residual `100 - sum` onto the first category (other
/// than `skip`) that is positive and stays within 0..=100 after the shift.
/// A negative residual that no single category can absorb is taken from the
/// positive categories in order. Leaves the map untouched when no category
/// is positive.
pub(crate) fn absorb_residual(percentages: &mut Percentages, skip: Option<Category>) {
    let total: Decimal = percentages.values().copied().sum();
    let residual = HUNDRED - total;
    if residual.is_zero() {
        return;
    }

    let target = percentages.iter_mut().find(|(c, p)| {
        Some(**c) != skip
            && **p > Decimal::ZERO
            && (**p + residual) >= Decimal::ZERO
            && (**p + residual) <= HUNDRED
    });
    if let Some((c, p)) = target {
        log::debug!("absorbing rounding residual {residual} into {c}");
        *p += residual;
        return;
    }

    let mut excess = -residual;
    if excess > Decimal::ZERO {
        for (c, p) in percentages.iter_mut() {
            if Some(*c) == skip || *p <= Decimal::ZERO {
                continue;
            }
            let take = excess.min(*p);
            *p -= take;
            excess -= take;
            if excess.is_zero() {
                log::debug!("rounding residual {residual} spread up to {c}");
                return;
            }
        }
    }
    log::debug!("rounding residual {residual} left uncorrected");
}

/// Check that `total` can be used as a monthly budget: not negative, and
/// small enough that every per-category limit is representable.
pub fn validate_total(total: Decimal) -> Result<(), BudgetError> {
    if total < Decimal::ZERO {
        return Err(BudgetError::InvalidBudget(format!(
            "total budget cannot be negative ({total})"
        )));
    }
    if total.checked_mul(HUNDRED).is_none() {
        return Err(too_large(total));
    }
    Ok(())
}

fn too_large(total: Decimal) -> BudgetError {
    BudgetError::InvalidBudget(format!("total budget too large ({total})"))
}

/// Monthly, daily and weekly limits for every category, at full precision.
pub fn compute_derived_limits(
    total_monthly_budget: Decimal,
    percentages: &Percentages,
) -> Result<BTreeMap<Category, PeriodLimits>, BudgetError> {
    validate_total(total_monthly_budget)?;

    Category::all()
        .iter()
        .map(|c| {
            let pct = percentages.get(c).copied().unwrap_or(Decimal::ZERO);
            let monthly = total_monthly_budget
                .checked_mul(pct)
                .and_then(|m| m.checked_div(HUNDRED))
                .ok_or_else(|| too_large(total_monthly_budget))?;
            Ok((
                *c,
                PeriodLimits {
                    monthly,
                    daily: monthly / DAYS_PER_MONTH,
                    weekly: monthly / WEEKS_PER_MONTH,
                },
            ))
        })
        .collect()
}

/// Parse a user-entered total budget.
pub fn parse_total_budget(input: &str) -> Result<Decimal, BudgetError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BudgetError::InvalidBudget("total budget is required".into()));
    }
    let amount = Decimal::from_str(trimmed)
        .map_err(|_| BudgetError::InvalidBudget(format!("'{trimmed}' is not a number")))?;
    validate_total(amount)?;
    Ok(amount)
}

/// True when the percentages sum to 100 within ±0.01.
pub fn validate_for_save(percentages: &Percentages) -> bool {
    let total: Decimal = percentages.values().copied().sum();
    (total - HUNDRED).abs() <= SUM_TOLERANCE
}

#[cfg(test)]
mod tests;
