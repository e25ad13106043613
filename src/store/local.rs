use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use super::{schema, BudgetStore, LoadedPlan, SaveMode};
use crate::allocator::{self, HUNDRED};
use crate::error::BudgetError;
use crate::models::{AllocationPlan, Category, Expense, Percentages, UserId};

/// Plans and expenses kept in a local SQLite file. Used when no API is
/// configured; stores the total and percentages directly.
pub struct SqliteStore {
    conn: Connection,
    label: String,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, BudgetError> {
        let conn = Connection::open(path).map_err(|e| {
            BudgetError::Persistence(format!("Failed to open database {}: {e}", path.display()))
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let mut store = Self {
            conn,
            label: path.display().to_string(),
        };
        store.migrate()?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self, BudgetError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut store = Self {
            conn,
            label: ":memory:".into(),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&mut self) -> Result<(), BudgetError> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    pub fn insert_expense(&self, expense: &Expense) -> Result<i64, BudgetError> {
        self.conn.execute(
            "INSERT INTO expenses (email, category, amount, date, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                expense.email,
                expense.category.as_str(),
                expense.amount.to_string(),
                expense.date.map(|d| d.format("%Y-%m-%d").to_string()),
                expense.notes,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    #[cfg(test)]
    pub(crate) fn plan_updated_at(&self, user: &UserId) -> Result<Option<String>, BudgetError> {
        Ok(self
            .conn
            .query_row(
                "SELECT updated_at FROM plans WHERE email = ?1",
                params![user.as_str()],
                |row| row.get(0),
            )
            .optional()?)
    }
}

/// Amounts are stored as text; anything unparsable means the file was
/// edited or damaged outside the app.
fn stored_decimal(what: &str, raw: &str) -> Result<Decimal, BudgetError> {
    Decimal::from_str(raw.trim())
        .map_err(|_| BudgetError::Persistence(format!("corrupt stored {what}: '{raw}'")))
}

impl BudgetStore for SqliteStore {
    fn load_plan(&self, user: &UserId) -> Result<LoadedPlan, BudgetError> {
        let total: Option<String> = self
            .conn
            .query_row(
                "SELECT total_budget FROM plans WHERE email = ?1",
                params![user.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(total) = total else {
            return Ok(LoadedPlan::missing());
        };

        let mut stmt = self
            .conn
            .prepare("SELECT category, percentage FROM allocations WHERE email = ?1")?;
        let rows = stmt.query_map(params![user.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let total = stored_decimal("total budget", &total)?;
        allocator::validate_total(total)
            .map_err(|e| BudgetError::Persistence(format!("stored budget rejected: {e}")))?;

        let mut percentages = Percentages::new();
        for row in rows {
            let (label, pct) = row?;
            let Ok(category) = Category::parse(&label) else {
                log::warn!("Ignoring stored allocation for unknown category '{label}'");
                continue;
            };
            let pct = stored_decimal(&format!("{category} percentage"), &pct)?;
            if pct < Decimal::ZERO || pct > HUNDRED {
                return Err(BudgetError::Persistence(format!(
                    "corrupt stored {category} percentage: {pct}"
                )));
            }
            percentages.insert(category, pct);
        }

        Ok(LoadedPlan {
            plan: AllocationPlan::new(total, percentages),
            existed: true,
        })
    }

    fn save_plan(
        &mut self,
        user: &UserId,
        plan: &AllocationPlan,
        mode: SaveMode,
    ) -> Result<(), BudgetError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO plans (email, total_budget, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(email) DO UPDATE SET total_budget = ?2, updated_at = ?3",
            params![
                user.as_str(),
                plan.total_monthly_budget.to_string(),
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        tx.execute(
            "DELETE FROM allocations WHERE email = ?1",
            params![user.as_str()],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO allocations (email, category, percentage) VALUES (?1, ?2, ?3)",
            )?;
            for (category, pct) in &plan.percentages {
                stmt.execute(params![user.as_str(), category.as_str(), pct.to_string()])?;
            }
        }
        tx.commit()?;
        log::info!("Saved budget for {user} ({mode:?}) to {}", self.label);
        Ok(())
    }

    fn load_expenses(&self, user: &UserId) -> Result<Vec<Expense>, BudgetError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, category, amount, date, notes FROM expenses
             WHERE email = ?1 ORDER BY date DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![user.as_str()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut expenses = Vec::new();
        for row in rows {
            let (id, email, label, amount, date, notes) = row?;
            let Ok(category) = Category::parse(&label) else {
                log::warn!("Skipping stored expense {id} with unknown category '{label}'");
                continue;
            };
            expenses.push(Expense {
                id: Some(id),
                email,
                category,
                amount: stored_decimal(&format!("expense {id} amount"), &amount)?,
                date: date.as_deref().and_then(super::wire::parse_date),
                notes,
            });
        }
        Ok(expenses)
    }

    fn describe(&self) -> String {
        format!("local:{}", self.label)
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
