use crate::error::BudgetError;

/// Fixed spending labels. Declaration order is the canonical iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Bills,
    Savings,
    Shopping,
    Utilities,
    Health,
    Snacks,
    Fitness,
    Others,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Bills => "Bills",
            Self::Savings => "Savings",
            Self::Shopping => "Shopping",
            Self::Utilities => "Utilities",
            Self::Health => "Health",
            Self::Snacks => "Snacks",
            Self::Fitness => "Fitness",
            Self::Others => "Others",
        }
    }

    /// Case-insensitive lookup by label.
    pub fn parse(s: &str) -> Result<Self, BudgetError> {
        let lower = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().to_lowercase() == lower)
            .ok_or_else(|| BudgetError::UnknownCategory(s.trim().to_string()))
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Transport,
            Self::Entertainment,
            Self::Bills,
            Self::Savings,
            Self::Shopping,
            Self::Utilities,
            Self::Health,
            Self::Snacks,
            Self::Fitness,
            Self::Others,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
