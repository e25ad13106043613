use std::collections::HashMap;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use std::str::FromStr;

use super::app::{App, Screen};
use crate::allocator;
use crate::error::BudgetError;
use crate::models::Category;
use crate::store::{BudgetStore, SaveMode};
use crate::ui::util::{format_amount, format_percent};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut dyn BudgetStore) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit TrackWise", cmd_quit, r);
    register_command!("quit", "Quit TrackWise", cmd_quit, r);
    register_command!(
        "set",
        "Set a category share (e.g. :set Food 30)",
        cmd_set,
        r
    );
    register_command!(
        "total",
        "Set the total monthly budget (e.g. :total 30000)",
        cmd_total,
        r
    );
    register_command!("w", "Save the plan", cmd_save, r);
    register_command!("save", "Save the plan", cmd_save, r);
    register_command!("discard", "Discard unsaved changes", cmd_discard, r);
    register_command!("reload", "Reload the saved plan", cmd_reload, r);
    register_command!("a", "Go to Allocation", cmd_allocation, r);
    register_command!("allocation", "Go to Allocation", cmd_allocation, r);
    register_command!("i", "Go to Insights", cmd_insights, r);
    register_command!(
        "insights",
        "Spending insights (e.g. :insights 2024-03, :insights all)",
        cmd_insights,
        r
    );
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);

    r
});

/// Run a `:` command. Failures land in the status line so the draft
/// survives a failed save or a bad argument.
pub(crate) fn handle_command(input: &str, app: &mut App, store: &mut dyn BudgetStore) {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        if let Err(e) = (cmd.run)(args, app, store) {
            log::warn!("Command :{cmd_name} failed: {e:#}");
            app.set_status(format!("Error: {e:#}"));
        }
    } else {
        // Try fuzzy match
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Save the session and report the outcome. Shared with the `s` key.
pub(crate) fn save_plan(app: &mut App, store: &mut dyn BudgetStore) {
    match app.session.save(store) {
        Ok(mode) => {
            let verb = match mode {
                SaveMode::Create => "Created",
                SaveMode::Replace => "Saved",
            };
            app.set_status(format!("{verb} budget for {}", app.session.user()));
            if let Err(e) = app.recompute_insights() {
                log::warn!("Failed to refresh insights: {e:#}");
            }
        }
        Err(BudgetError::AllocationSum { total }) => {
            app.set_status(format!(
                "Allocations sum to {}, they must total 100% to save",
                format_percent(total)
            ));
        }
        Err(e) => app.set_status(format!("Not saved: {e}. Your edits are kept.")),
    }
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _store: &mut dyn BudgetStore) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_set(args: &str, app: &mut App, _store: &mut dyn BudgetStore) -> anyhow::Result<()> {
    let Some((name, pct)) = args.rsplit_once(' ') else {
        app.set_status("Usage: :set <category> <percent>");
        return Ok(());
    };
    let category = Category::parse(name)?;
    let requested = Decimal::from_str(pct.trim().trim_end_matches('%'))
        .map_err(|_| anyhow::anyhow!("Invalid percentage: {pct}"))?;

    let effective = app.session.set_percentage(category, requested);
    app.recompute_insights()?;
    app.category_index = Category::all()
        .iter()
        .position(|c| *c == category)
        .unwrap_or(0);
    app.set_status(format!(
        "{category} set to {} (allocated {})",
        format_percent(effective),
        format_percent(app.session.plan().percentage_sum())
    ));
    Ok(())
}

fn cmd_total(args: &str, app: &mut App, _store: &mut dyn BudgetStore) -> anyhow::Result<()> {
    let amount = allocator::parse_total_budget(args)?;
    app.session.set_total(amount)?;
    app.recompute_insights()?;
    app.set_status(format!("Total budget: {}", format_amount(amount)));
    Ok(())
}

fn cmd_save(_args: &str, app: &mut App, store: &mut dyn BudgetStore) -> anyhow::Result<()> {
    save_plan(app, store);
    Ok(())
}

fn cmd_discard(_args: &str, app: &mut App, _store: &mut dyn BudgetStore) -> anyhow::Result<()> {
    app.session.discard();
    app.recompute_insights()?;
    app.set_status("Changes discarded");
    Ok(())
}

fn cmd_reload(_args: &str, app: &mut App, store: &mut dyn BudgetStore) -> anyhow::Result<()> {
    app.reload(store)?;
    app.set_status(format!("Reloaded from {}", store.describe()));
    Ok(())
}

fn cmd_allocation(_args: &str, app: &mut App, _store: &mut dyn BudgetStore) -> anyhow::Result<()> {
    app.screen = Screen::Allocation;
    Ok(())
}

fn cmd_insights(args: &str, app: &mut App, store: &mut dyn BudgetStore) -> anyhow::Result<()> {
    match args {
        "" => {}
        "all" => app.insight_month = None,
        month => app.insight_month = Some(crate::run::cli::parse_month(month)?),
    }
    app.screen = Screen::Insights;
    app.refresh_insights(store)?;
    app.set_status(format!(
        "Insights for {}",
        app.insight_month.as_deref().unwrap_or("all time")
    ));
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _store: &mut dyn BudgetStore) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
