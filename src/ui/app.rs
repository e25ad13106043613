use anyhow::{Context, Result};

use crate::insights::{self, CategoryInsight};
use crate::models::{Category, Expense};
use crate::session::BudgetSession;
use crate::store::BudgetStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Allocation,
    Insights,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Allocation, Self::Insights]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allocation => write!(f, "Allocation"),
            Self::Insights => write!(f, "Insights"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
        }
    }
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) store_label: String,

    pub(crate) session: BudgetSession,

    // Allocation
    pub(crate) category_index: usize,
    pub(crate) category_scroll: usize,

    // Insights
    pub(crate) expenses: Vec<Expense>,
    pub(crate) insights: Vec<CategoryInsight>,
    pub(crate) insight_index: usize,
    pub(crate) insight_scroll: usize,
    pub(crate) insight_month: Option<String>,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(session: BudgetSession, store_label: String) -> Self {
        Self {
            running: true,
            screen: Screen::Allocation,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            store_label,

            session,

            category_index: 0,
            category_scroll: 0,

            expenses: Vec::new(),
            insights: Vec::new(),
            insight_index: 0,
            insight_scroll: 0,
            insight_month: Some(chrono::Local::now().format("%Y-%m").to_string()),

            visible_rows: 20,
        }
    }

    pub(crate) fn selected_category(&self) -> Category {
        let all = Category::all();
        all[self.category_index.min(all.len() - 1)]
    }

    /// Rows visible in the current screen's list.
    pub(crate) fn page(&self) -> usize {
        match self.screen {
            // Summary box plus table border and header
            Screen::Allocation => self.visible_rows.saturating_sub(7),
            Screen::Insights => self.visible_rows.saturating_sub(2),
        }
        .max(1)
    }

    /// Reload the saved plan, dropping any draft.
    pub(crate) fn reload(&mut self, store: &dyn BudgetStore) -> Result<()> {
        self.session
            .load(store)
            .with_context(|| format!("Failed to load budget from {}", store.describe()))?;
        if self.screen == Screen::Insights {
            self.refresh_insights(store)?;
        } else {
            self.recompute_insights()?;
        }
        Ok(())
    }

    /// Fetch expenses from the store and recompute the insights.
    pub(crate) fn refresh_insights(&mut self, store: &dyn BudgetStore) -> Result<()> {
        self.expenses = store.load_expenses(self.session.user())?;
        self.recompute_insights()
    }

    /// Compare the cached expenses to the limits currently on screen. Called
    /// whenever the plan changes so the insights never show stale limits.
    pub(crate) fn recompute_insights(&mut self) -> Result<()> {
        let limits = self.session.limits()?;
        self.insights = insights::summarize(
            &self.expenses,
            &limits,
            self.session.user(),
            self.insight_month.as_deref(),
        );
        if self.insight_index >= self.insights.len() {
            self.insight_index = self.insights.len().saturating_sub(1);
            self.insight_scroll = self.insight_scroll.min(self.insight_index);
        }
        Ok(())
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
