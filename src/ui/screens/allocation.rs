use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use crate::allocator::HUNDRED;
use crate::models::Category;
use crate::session::Mode;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent, ratio_bar};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    render_summary(f, chunks[0], app);
    render_table(f, chunks[1], app);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let session = &app.session;
    let plan = session.plan();
    let sum = plan.percentage_sum();

    let (sum_text, sum_style) = if session.is_valid() {
        (format!("{} allocated", format_percent(sum)), theme::valid_style())
    } else {
        (
            format!("{} allocated, must be 100% to save", format_percent(sum)),
            theme::invalid_style(),
        )
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(" Total  ", theme::dim_style()),
        Span::styled(
            format_amount(plan.total_monthly_budget),
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" / month    ", theme::dim_style()),
        Span::styled(sum_text, sum_style),
    ])];

    let hint = if !session.has_remote_plan() && session.mode() == Mode::Viewing {
        " No budget saved yet. Press e to edit, then :total <amount> and s to save"
    } else if session.is_dirty() {
        " Unsaved changes. s save, Esc discard"
    } else {
        " Press e to edit, +/- to nudge the selected category"
    };
    lines.push(Line::from(Span::styled(hint, theme::dim_style())));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {} ", session.user()),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let session = &app.session;
    let plan = session.plan();
    let saved = session.saved_plan();
    let limits = session.limits().unwrap_or_default();

    let header_cells = ["Category", "Share", "", "Monthly", "Weekly", "Daily"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = Category::all()
        .iter()
        .enumerate()
        .skip(app.category_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, category)| {
            let pct = plan.percentage(*category);
            let changed = pct != saved.percentage(*category);
            let ratio = (pct / HUNDRED).to_f64().unwrap_or(0.0);
            let limit = limits.get(category).copied().unwrap_or_default();

            let style = if i == app.category_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let name = if changed {
                format!("* {category}")
            } else {
                format!("  {category}")
            };

            Row::new(vec![
                Cell::from(name),
                Cell::from(format_percent(pct)),
                Cell::from(Span::styled(
                    ratio_bar(ratio, 20),
                    Style::default().fg(theme::ACCENT),
                )),
                Cell::from(format_amount(limit.monthly)),
                Cell::from(format_amount(limit.weekly)),
                Cell::from(format_amount(limit.daily)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(9),
        Constraint::Length(22),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" Allocation [{}] ", session.mode()),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}
