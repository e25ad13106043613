use crate::error::BudgetError;

/// Identity the plan is keyed by (the user's e-mail address).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: &str) -> Result<Self, BudgetError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BudgetError::MissingUser);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
