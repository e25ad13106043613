use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io::Write;
use std::str::FromStr;

use crate::allocator;
use crate::config::{Backend, Config};
use crate::error::BudgetError;
use crate::models::{AllocationPlan, Category, Expense};
use crate::session::BudgetSession;
use crate::store::{BudgetStore, SaveMode, SqliteStore};
use crate::ui::util::{format_amount, format_percent};

pub(crate) fn as_cli(args: &[String], config: &Config) -> Result<()> {
    match args[0].as_str() {
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("trackwise {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "show" => with_session(config, |session, _| cli_show(session)),
        "limits" | "l" => with_session(config, |session, _| cli_limits(session)),
        "set" => with_session(config, |session, store| cli_set(&args[1..], session, store)),
        "total" => with_session(config, |session, store| cli_total(&args[1..], session, store)),
        "export" => with_session(config, |session, _| cli_export(&args[1..], session)),
        "insights" | "i" => {
            with_session(config, |session, store| cli_insights(&args[1..], session, store))
        }
        "add-expense" => cli_add_expense(&args[1..], config),
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("TrackWise - budget allocator");
    println!();
    println!("Usage: trackwise [--api <url> | --local] [--user <email>] [--db <path>] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  show                          Print the saved plan");
    println!("  limits                        Print daily/weekly/monthly limits");
    println!("  set <category> <percent>      Set a category and rebalance the rest, then save");
    println!("  total <amount>                Set the total monthly budget, then save");
    println!("  export [path]                 Export limits to CSV");
    println!("  insights [YYYY-MM]            Compare spending with monthly limits");
    println!("  add-expense <category> <amount> [YYYY-MM-DD] [notes]");
    println!("                                Record an expense (local store only)");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Environment: TRACKWISE_API_URL, TRACKWISE_USER, TRACKWISE_DB, TRACKWISE_TIMEOUT_SECS");
}

fn with_session<F>(config: &Config, f: F) -> Result<()>
where
    F: FnOnce(&mut BudgetSession, &mut dyn BudgetStore) -> Result<()>,
{
    let user = config.user_id()?;
    let mut store = config.open_store()?;
    let mut session = BudgetSession::new(user);
    session
        .load(store.as_ref())
        .with_context(|| format!("Failed to load budget from {}", store.describe()))?;
    f(&mut session, store.as_mut())
}

fn cli_show(session: &BudgetSession) -> Result<()> {
    let plan = session.plan();
    println!("TrackWise - {}", session.user());
    println!("{}", "─".repeat(40));
    if !session.has_remote_plan() {
        println!("  No budget saved yet. Use `trackwise total <amount>` to start.");
        return Ok(());
    }
    println!("  Total:      {}", format_amount(plan.total_monthly_budget));
    println!();
    let limits = session.limits()?;
    for category in Category::all() {
        println!(
            "  {:<16} {:>8}  {:>14}",
            category.as_str(),
            format_percent(plan.percentage(*category)),
            format_amount(limits[category].monthly),
        );
    }
    println!("{}", "─".repeat(40));
    print_sum_line(plan);
    Ok(())
}

fn print_sum_line(plan: &AllocationPlan) {
    let sum = plan.percentage_sum();
    if allocator::validate_for_save(&plan.percentages) {
        println!("  Allocated  {}", format_percent(sum));
    } else {
        println!("  Allocated  {}  (must be 100% to save)", format_percent(sum));
    }
}

fn cli_limits(session: &BudgetSession) -> Result<()> {
    let limits = session.limits()?;
    println!(
        "{:<16} {:>8} {:>14} {:>12} {:>10}",
        "Category", "Share", "Monthly", "Weekly", "Daily"
    );
    println!("{}", "─".repeat(64));
    for (category, limit) in &limits {
        println!(
            "{:<16} {:>8} {:>14} {:>12} {:>10}",
            category.as_str(),
            format_percent(session.plan().percentage(*category)),
            format_amount(limit.monthly),
            format_amount(limit.weekly),
            format_amount(limit.daily),
        );
    }
    Ok(())
}

fn cli_set(args: &[String], session: &mut BudgetSession, store: &mut dyn BudgetStore) -> Result<()> {
    if args.len() < 2 {
        anyhow::bail!("Usage: trackwise set <category> <percent>");
    }
    // Last token is the percentage, everything before is the category name
    let (pct_arg, name_args) = args.split_last().context("missing percentage")?;
    let category = Category::parse(&name_args.join(" "))?;
    let requested = Decimal::from_str(pct_arg.trim_end_matches('%'))
        .map_err(|_| anyhow::anyhow!("Invalid percentage: {pct_arg}"))?;

    let before = session.plan().clone();
    let effective = session.set_percentage(category, requested);
    if effective != requested {
        println!("{category} clamped to {}", format_percent(effective));
    }
    for c in Category::all() {
        let old = before.percentage(*c);
        let new = session.plan().percentage(*c);
        if old != new {
            println!(
                "  {:<16} {:>8} -> {:>8}",
                c.as_str(),
                format_percent(old),
                format_percent(new)
            );
        }
    }
    save(session, store)
}

fn cli_total(args: &[String], session: &mut BudgetSession, store: &mut dyn BudgetStore) -> Result<()> {
    let amount = allocator::parse_total_budget(&args.join(" "))?;
    session.set_total(amount)?;
    if !session.has_remote_plan() && session.plan().percentage_sum().is_zero() {
        // New plans start fully in Savings
        session.set_percentage(Category::Savings, allocator::HUNDRED);
        println!("New plan: 100% allocated to Savings. Use `trackwise set` to split it.");
    }
    println!("Total budget: {}", format_amount(amount));
    save(session, store)
}

fn save(session: &mut BudgetSession, store: &mut dyn BudgetStore) -> Result<()> {
    match session.save(store) {
        Ok(mode) => {
            let verb = match mode {
                SaveMode::Create => "Created",
                SaveMode::Replace => "Updated",
            };
            println!("{verb} budget for {} ({})", session.user(), store.describe());
            Ok(())
        }
        Err(e @ BudgetError::AllocationSum { .. }) => {
            print_sum_line(session.plan());
            Err(e).context("Budget not saved")
        }
        Err(e) => Err(e).context("Budget not saved"),
    }
}

fn cli_export(args: &[String], session: &BudgetSession) -> Result<()> {
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/trackwise-limits.csv")
        });

    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("Failed to create {output_path}"))?;
    let count = write_limits_csv(file, session.plan())?;
    println!("Exported {count} categories to {output_path}");
    Ok(())
}

/// Write one row per category: share, monthly, weekly and daily limit.
pub(crate) fn write_limits_csv<W: Write>(writer: W, plan: &AllocationPlan) -> Result<usize> {
    let limits = allocator::compute_derived_limits(plan.total_monthly_budget, &plan.percentages)?;
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["category", "percentage", "monthly", "weekly", "daily"])?;
    for (category, limit) in &limits {
        wtr.write_record([
            category.as_str().to_string(),
            plan.percentage(*category).round_dp(2).to_string(),
            limit.monthly.round_dp(2).to_string(),
            limit.weekly.round_dp(2).to_string(),
            limit.daily.round_dp(2).to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(limits.len())
}

fn cli_insights(args: &[String], session: &BudgetSession, store: &mut dyn BudgetStore) -> Result<()> {
    let month = match args.first().filter(|a| !a.starts_with('-')) {
        Some(m) => Some(parse_month(m)?),
        None => None,
    };
    let expenses = store.load_expenses(session.user())?;
    let limits = session.limits()?;
    let summary = crate::insights::summarize(&expenses, &limits, session.user(), month.as_deref());

    println!(
        "Spending insights - {}",
        month.as_deref().unwrap_or("all time")
    );
    println!("{}", "─".repeat(72));
    if summary.is_empty() {
        println!("  No expenses recorded");
        return Ok(());
    }
    for insight in &summary {
        let pct = insight
            .spent_percent
            .map(format_percent)
            .unwrap_or_else(|| "no limit".into());
        println!(
            "  {:<14} {:>12} / {:<12} {:>9}  {}",
            insight.category.as_str(),
            format_amount(insight.spent),
            format_amount(insight.limit),
            pct,
            insight.advice,
        );
    }
    Ok(())
}

fn cli_add_expense(args: &[String], config: &Config) -> Result<()> {
    let Backend::Local { path } = &config.backend else {
        anyhow::bail!("add-expense only works with the local store (use --local)");
    };
    if args.len() < 2 {
        anyhow::bail!("Usage: trackwise add-expense <category> <amount> [YYYY-MM-DD] [notes]");
    }
    let user = config.user_id()?;
    let category = Category::parse(&args[0])?;
    let amount = Decimal::from_str(&args[1])
        .ok()
        .filter(|a| *a > Decimal::ZERO)
        .ok_or_else(|| anyhow::anyhow!("Invalid amount: {}", args[1]))?;

    let (date, notes_from) = match args.get(2).map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d")) {
        Some(Ok(date)) => (date, 3),
        _ => (chrono::Local::now().date_naive(), 2),
    };

    let mut expense = Expense::new(user.as_str().to_string(), category, amount, date);
    expense.notes = args.get(notes_from..).unwrap_or_default().join(" ");

    let store = SqliteStore::open(path)?;
    store.insert_expense(&expense)?;
    println!("Recorded {category} expense of {} on {date}", format_amount(amount));
    Ok(())
}

/// Accepts "YYYY-MM"; validated by parsing the first day of that month.
pub(crate) fn parse_month(input: &str) -> Result<String> {
    let month = input.trim();
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m").to_string())
        .map_err(|_| anyhow::anyhow!("Invalid month: {month} (expected YYYY-MM)"))
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
