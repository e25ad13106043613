use reqwest::blocking::{Client, Request};
use reqwest::StatusCode;
use std::time::Duration;

use super::wire::{BudgetPayload, ExpenseRecord};
use super::{BudgetStore, LoadedPlan, SaveMode};
use crate::error::BudgetError;
use crate::models::{AllocationPlan, Expense, UserId};

/// Client for the remote persistence API (`/budget`, `/expenses`).
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BudgetError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    pub(crate) fn load_request(&self, user: &UserId) -> Result<Request, BudgetError> {
        Ok(self
            .client
            .get(self.url("budget"))
            .query(&[("email", user.as_str())])
            .build()?)
    }

    /// `POST /budget` for a first plan, `PUT /budget` to replace one.
    pub(crate) fn save_request(
        &self,
        user: &UserId,
        plan: &AllocationPlan,
        mode: SaveMode,
    ) -> Result<Request, BudgetError> {
        let payload = BudgetPayload::from_plan(user, plan)?;
        let builder = match mode {
            SaveMode::Create => self.client.post(self.url("budget")),
            SaveMode::Replace => self.client.put(self.url("budget")),
        };
        Ok(builder.json(&payload).build()?)
    }

    pub(crate) fn expenses_request(&self, user: &UserId) -> Result<Request, BudgetError> {
        Ok(self
            .client
            .get(self.url("expenses"))
            .query(&[("email", user.as_str())])
            .build()?)
    }

    fn execute(&self, request: Request) -> Result<Option<String>, BudgetError> {
        let method = request.method().clone();
        let url = request.url().clone();
        log::debug!("{method} {url}");

        let response = self.client.execute(request)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND && method == reqwest::Method::GET {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BudgetError::Persistence(format!(
                "{method} {} failed with {status}: {}",
                url.path(),
                body.trim()
            )));
        }
        Ok(Some(response.text()?))
    }
}

/// Empty bodies, `null`, `{}` and an all-zero budget mean "no plan yet".
pub(crate) fn parse_budget_body(body: &str) -> Result<LoadedPlan, BudgetError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(LoadedPlan::missing());
    }
    let payload: Option<BudgetPayload> = serde_json::from_str(trimmed)?;
    match payload {
        Some(payload) => payload.into_loaded(),
        None => Ok(LoadedPlan::missing()),
    }
}

/// Keeps only well-formed expenses that belong to `user`.
pub(crate) fn parse_expenses_body(body: &str, user: &UserId) -> Result<Vec<Expense>, BudgetError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let records: Option<Vec<ExpenseRecord>> = serde_json::from_str(trimmed)?;
    Ok(records
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.email.is_empty() || r.email == user.as_str())
        .filter_map(ExpenseRecord::into_expense)
        .collect())
}

impl BudgetStore for HttpStore {
    fn load_plan(&self, user: &UserId) -> Result<LoadedPlan, BudgetError> {
        let request = self.load_request(user)?;
        match self.execute(request)? {
            Some(body) => parse_budget_body(&body),
            None => Ok(LoadedPlan::missing()),
        }
    }

    fn save_plan(
        &mut self,
        user: &UserId,
        plan: &AllocationPlan,
        mode: SaveMode,
    ) -> Result<(), BudgetError> {
        let request = self.save_request(user, plan, mode)?;
        self.execute(request)?;
        log::info!("Saved budget for {user} ({mode:?})");
        Ok(())
    }

    fn load_expenses(&self, user: &UserId) -> Result<Vec<Expense>, BudgetError> {
        let request = self.expenses_request(user)?;
        match self.execute(request)? {
            Some(body) => parse_expenses_body(&body, user),
            None => Ok(Vec::new()),
        }
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
