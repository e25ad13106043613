//! JSON schema of the persistence API.
//!
//! Amounts are read leniently: the API has stored both JSON numbers and
//! numeric strings, so either is accepted and anything else is skipped.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::LoadedPlan;
use crate::allocator::{self, HUNDRED};
use crate::error::BudgetError;
use crate::models::{AllocationPlan, Category, Expense, Percentages, UserId};

pub(crate) type AmountMap = BTreeMap<String, Decimal>;

/// Body of `GET /budget` responses and `POST`/`PUT /budget` requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct BudgetPayload {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub(crate) email: String,
    #[serde(default, deserialize_with = "deserialize_amounts")]
    pub(crate) daily: AmountMap,
    #[serde(default, deserialize_with = "deserialize_amounts")]
    pub(crate) weekly: AmountMap,
    #[serde(default, deserialize_with = "deserialize_amounts")]
    pub(crate) monthly: AmountMap,
}

impl BudgetPayload {
    pub(crate) fn from_plan(user: &UserId, plan: &AllocationPlan) -> Result<Self, BudgetError> {
        let limits =
            allocator::compute_derived_limits(plan.total_monthly_budget, &plan.percentages)?;
        let mut payload = Self {
            email: user.as_str().to_string(),
            ..Self::default()
        };
        for (category, limit) in &limits {
            let key = category.as_str().to_string();
            payload.monthly.insert(key.clone(), limit.monthly);
            payload.daily.insert(key.clone(), limit.daily.round_dp(2));
            payload.weekly.insert(key, limit.weekly.round_dp(2));
        }
        Ok(payload)
    }

    /// Rebuild a plan from the monthly amounts: the total is their sum and
    /// each percentage is the category's share of it. A zero total means
    /// no plan was saved.
    pub(crate) fn into_loaded(self) -> Result<LoadedPlan, BudgetError> {
        let overflow = || BudgetError::Persistence("monthly amounts overflow".into());

        let mut monthly: BTreeMap<Category, Decimal> = BTreeMap::new();
        for (label, amount) in self.monthly {
            let Ok(category) = Category::parse(&label) else {
                log::warn!("Ignoring unknown budget category '{label}'");
                continue;
            };
            if amount < Decimal::ZERO {
                log::warn!("Ignoring negative monthly amount for {category}: {amount}");
                continue;
            }
            let entry = monthly.entry(category).or_insert(Decimal::ZERO);
            *entry = entry.checked_add(amount).ok_or_else(overflow)?;
        }

        let total = monthly
            .values()
            .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(*amount))
            .ok_or_else(overflow)?;
        if total.is_zero() {
            return Ok(LoadedPlan::missing());
        }
        allocator::validate_total(total)
            .map_err(|e| BudgetError::Persistence(format!("stored budget rejected: {e}")))?;

        // Each amount is at most the total, so shares stay within 0..=100
        let mut percentages = Percentages::new();
        for (category, amount) in &monthly {
            percentages.insert(*category, allocator::round_percent(*amount / total * HUNDRED));
        }
        allocator::absorb_residual(&mut percentages, None);

        Ok(LoadedPlan {
            plan: AllocationPlan::new(total, percentages),
            existed: true,
        })
    }
}

/// One element of the `GET /expenses` array.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExpenseRecord {
    #[serde(default)]
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) category: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub(crate) amount: Option<Decimal>,
    #[serde(default, alias = "dateTime")]
    pub(crate) date: Option<String>,
    #[serde(default, alias = "note")]
    pub(crate) notes: Option<String>,
}

impl ExpenseRecord {
    pub(crate) fn into_expense(self) -> Option<Expense> {
        let category = match Category::parse(&self.category) {
            Ok(c) => c,
            Err(_) => {
                log::warn!("Skipping expense with unknown category '{}'", self.category);
                return None;
            }
        };
        let Some(amount) = self.amount else {
            log::warn!("Skipping {category} expense without a valid amount");
            return None;
        };
        Some(Expense {
            id: None,
            email: self.email,
            category,
            amount,
            date: self.date.as_deref().and_then(parse_date),
            notes: self.notes.unwrap_or_default(),
        })
    }
}

/// Accepts "2024-03-05" as well as ISO timestamps starting with a date.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

pub(crate) fn amount_from_json(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            Decimal::from_str(trimmed).ok()
        }
        _ => None,
    }
}

fn deserialize_amounts<'de, D>(deserializer: D) -> Result<AmountMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(label, value)| match amount_from_json(&value) {
            Some(amount) => Some((label, amount)),
            None => {
                let blank = match &value {
                    serde_json::Value::Null => true,
                    serde_json::Value::String(s) => s.trim().is_empty(),
                    _ => false,
                };
                if !blank {
                    log::warn!("Ignoring non-numeric amount for '{label}': {value}");
                }
                None
            }
        })
        .collect())
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(amount_from_json))
}
