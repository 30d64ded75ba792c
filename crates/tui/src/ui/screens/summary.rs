use api_types::analytics::ChartData;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    ui::{
        components::{
            card::{Card, StatCard},
            charts::{breakdown_bars, daily_bars, render_bar_chart, render_daily_chart},
            money::styled_amount_bold,
        },
        theme::Theme,
    },
};

const MAX_BARS: usize = 8;
const MAX_DAYS: usize = 7;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let Some(summary) = &state.summary else {
        let card = Card::new("Summary", &theme);
        let inner = card.inner(area);
        card.render_frame(frame, area);
        let text = if state.loading { "Loading…" } else { "No data." };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
            inner,
        );
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let stats = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
        ])
        .split(layout[0]);

    StatCard::new("Income", money(summary.total_income), &theme)
        .color(theme.positive)
        .render(frame, stats[0]);
    StatCard::new("Expenses", money(summary.total_expenses), &theme)
        .color(theme.negative)
        .render(frame, stats[1]);

    let balance_card = Card::new("Balance", &theme);
    let balance_inner = balance_card.inner(stats[2]);
    balance_card.render_frame(frame, stats[2]);
    frame.render_widget(
        Paragraph::new(Line::from(styled_amount_bold(summary.balance, &theme))),
        balance_inner,
    );

    StatCard::new(
        "Transactions",
        summary.transaction_count.to_string(),
        &theme,
    )
    .render(frame, stats[3]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);

    // The chart endpoint carries the same breakdown; prefer it once loaded.
    let bars = match &state.charts {
        Some(data) => breakdown_bars(
            data.pie_chart
                .expenses
                .labels
                .iter()
                .map(String::as_str)
                .zip(data.pie_chart.expenses.data.iter().copied()),
            MAX_BARS,
        ),
        None => breakdown_bars(
            summary
                .category_breakdown
                .iter()
                .map(|(category, amount)| (category.as_str(), *amount)),
            MAX_BARS,
        ),
    };
    let title = format!("Spending by category · {}", state.period);
    render_bar_chart(frame, charts[0], &title, &bars, &theme);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(charts[1]);

    match &state.charts {
        Some(data) => {
            let days = daily_bars(&data.bar_chart, MAX_DAYS);
            render_daily_chart(frame, right[0], "Daily · expenses / income", &days, &theme);
            render_income_sources(frame, right[1], data, &theme);
        }
        None => {
            let card = Card::new("Daily", &theme);
            let inner = card.inner(charts[1]);
            card.render_frame(frame, charts[1]);
            let text = if state.loading { "Loading…" } else { "No chart data." };
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
                inner,
            );
        }
    }
}

fn render_income_sources(frame: &mut Frame<'_>, area: Rect, data: &ChartData, theme: &Theme) {
    let card = Card::new("Income sources", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let income = &data.pie_chart.income;
    let mut sources: Vec<(&str, f64)> = income
        .labels
        .iter()
        .map(String::as_str)
        .zip(income.data.iter().copied())
        .collect();
    sources.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut spans = Vec::new();
    for (name, amount) in &sources {
        if !spans.is_empty() {
            spans.push(Span::styled("  ·  ", Style::default().fg(theme.border)));
        }
        spans.push(Span::styled(format!("{name} "), Style::default().fg(theme.text)));
        spans.push(Span::styled(money(*amount), Style::default().fg(theme.positive)));
    }
    if spans.is_empty() {
        spans.push(Span::styled("No income.", Style::default().fg(theme.dim)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn money(amount: f64) -> String {
    engine::Money::from_major(amount).to_string()
}
