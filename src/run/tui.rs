use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rust_decimal::Decimal;
use std::io;

use crate::config::Config;
use crate::models::Category;
use crate::session::{BudgetSession, Mode};
use crate::store::BudgetStore;
use crate::ui::app::{App, InputMode, Screen};
use crate::ui::commands;
use crate::ui::util::{format_percent, scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

const SMALL_STEP: Decimal = Decimal::ONE;
const LARGE_STEP: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

pub(crate) fn as_tui(config: &Config) -> Result<()> {
    let user = config.user_id()?;
    let mut store = config.open_store()?;
    let mut app = App::new(BudgetSession::new(user), store.describe());
    app.reload(store.as_ref())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, store.as_mut());

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }
    if app.session.is_dirty() {
        eprintln!("Unsaved changes were discarded.");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &mut dyn BudgetStore,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, store),
                InputMode::Command => handle_command_input(key, app, store),
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, store: &mut dyn BudgetStore) {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') | KeyCode::Home => handle_goto_top(app),
        KeyCode::Char('G') | KeyCode::End => handle_goto_bottom(app),
        KeyCode::Char('1') => switch_screen(app, store, Screen::Allocation),
        KeyCode::Char('2') => switch_screen(app, store, Screen::Insights),
        KeyCode::Tab | KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, store, screens[next]);
        }
        KeyCode::Char('e') if app.screen == Screen::Allocation => {
            app.session.begin_edit();
            app.set_status("Editing. +/- nudge, s save, Esc discard");
        }
        KeyCode::Char('+') | KeyCode::Char('=') => handle_nudge(app, SMALL_STEP),
        KeyCode::Char('-') => handle_nudge(app, -SMALL_STEP),
        KeyCode::Char('>') | KeyCode::Char('.') => handle_nudge(app, LARGE_STEP),
        KeyCode::Char('<') | KeyCode::Char(',') => handle_nudge(app, -LARGE_STEP),
        KeyCode::Char('s') => commands::save_plan(app, store),
        KeyCode::Char('r') => match app.reload(store) {
            Ok(()) => app.set_status(format!("Reloaded from {}", store.describe())),
            Err(e) => app.set_status(format!("Error: {e:#}")),
        },
        KeyCode::Esc => handle_escape(app),
        _ => {}
    }
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, store: &mut dyn BudgetStore) {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, store);
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
}

fn switch_screen(app: &mut App, store: &dyn BudgetStore, screen: Screen) {
    app.screen = screen;
    if screen == Screen::Insights {
        if let Err(e) = app.refresh_insights(store) {
            log::warn!("Failed to load expenses: {e:#}");
            app.set_status(format!("Failed to load expenses: {e:#}"));
            return;
        }
    }
    app.set_status(format!("{screen}"));
}

/// Slider step on the selected category. Only applies while editing.
fn handle_nudge(app: &mut App, step: Decimal) {
    if app.screen != Screen::Allocation {
        return;
    }
    if app.session.mode() != Mode::Editing {
        app.set_status("Press e to edit the plan");
        return;
    }
    let category = app.selected_category();
    let effective = app.session.adjust_percentage(category, step);
    refresh_insights_quietly(app);
    let sum = app.session.plan().percentage_sum();
    app.set_status(format!(
        "{category} {} (allocated {})",
        format_percent(effective),
        format_percent(sum)
    ));
}

fn handle_escape(app: &mut App) {
    if app.session.mode() == Mode::Editing {
        app.session.discard();
        refresh_insights_quietly(app);
        app.set_status("Changes discarded");
    } else {
        app.status_message.clear();
    }
}

/// Keeps the insights in step with the plan after a key edit.
fn refresh_insights_quietly(app: &mut App) {
    if let Err(e) = app.recompute_insights() {
        log::warn!("Failed to refresh insights: {e:#}");
    }
}

fn handle_move_down(app: &mut App) {
    let page = app.page();
    match app.screen {
        Screen::Allocation => scroll_down(
            &mut app.category_index,
            &mut app.category_scroll,
            Category::all().len(),
            page,
        ),
        Screen::Insights => scroll_down(
            &mut app.insight_index,
            &mut app.insight_scroll,
            app.insights.len(),
            page,
        ),
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Allocation => scroll_up(&mut app.category_index, &mut app.category_scroll),
        Screen::Insights => scroll_up(&mut app.insight_index, &mut app.insight_scroll),
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Allocation => scroll_to_top(&mut app.category_index, &mut app.category_scroll),
        Screen::Insights => scroll_to_top(&mut app.insight_index, &mut app.insight_scroll),
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.page();
    match app.screen {
        Screen::Allocation => scroll_to_bottom(
            &mut app.category_index,
            &mut app.category_scroll,
            Category::all().len(),
            page,
        ),
        Screen::Insights => scroll_to_bottom(
            &mut app.insight_index,
            &mut app.insight_scroll,
            app.insights.len(),
            page,
        ),
    }
}
