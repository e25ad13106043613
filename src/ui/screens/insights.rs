use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent, ratio_bar, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let period = app.insight_month.as_deref().unwrap_or("All Time");
    if app.insights.is_empty() {
        render_empty(f, area, period);
        return;
    }

    let items: Vec<ListItem> = app
        .insights
        .iter()
        .enumerate()
        .skip(app.insight_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, insight)| {
            let color = theme::advice_color(insight.advice);
            let style = if i == app.insight_index {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let pct = insight
                .spent_percent
                .map(format_percent)
                .unwrap_or_else(|| "no limit".into());
            let name = truncate(insight.category.as_str(), 15);

            ListItem::new(Line::from(vec![
                Span::styled(format!("{name:<16}"), style),
                Span::styled(
                    format!(
                        "{:>12} / {:<12} ",
                        format_amount(insight.spent),
                        format_amount(insight.limit)
                    ),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!("[{}]", ratio_bar(insight.ratio(), 20)),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!(" {pct:>9} "),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {} ({} expenses)", insight.advice, insight.count),
                    theme::dim_style(),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" Spending vs monthly limits, {period} "),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(list, area);
}

fn render_empty(f: &mut Frame, area: Rect, period: &str) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("No expenses recorded for {period}"),
            theme::dim_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Use :insights all, or :insights YYYY-MM to pick another month",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                " Insights ",
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(msg, area);
}
