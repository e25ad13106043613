use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::Category;

#[derive(Debug, Clone)]
pub struct Expense {
    pub id: Option<i64>,
    pub email: String,
    pub category: Category,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub notes: String,
}

impl Expense {
    pub fn new(email: String, category: Category, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            id: None,
            email,
            category,
            amount,
            date: Some(date),
            notes: String::new(),
        }
    }

    /// Month key in "YYYY-MM" form, if the expense is dated.
    pub fn month(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m").to_string())
    }
}
