use api_types::analytics::BarChart as DailyTotals;
use chrono::NaiveDate;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup},
};

use crate::ui::{components::card::Card, theme::Theme};

/// One day of the daily chart, in whole currency units.
#[derive(Debug, PartialEq, Eq)]
pub struct DayBars {
    pub label: String,
    pub expenses: u64,
    pub income: u64,
}

fn whole_units(amount: f64) -> u64 {
    if amount.is_finite() {
        amount.max(0.0).round() as u64
    } else {
        0
    }
}

/// Bars for a per-category total, largest first, in whole currency units.
#[must_use]
pub fn breakdown_bars<'a>(
    entries: impl IntoIterator<Item = (&'a str, f64)>,
    limit: usize,
) -> Vec<(String, u64)> {
    let mut bars: Vec<(String, u64)> = entries
        .into_iter()
        .map(|(category, amount)| (category.to_string(), whole_units(amount)))
        .collect();
    bars.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    bars.truncate(limit);
    bars
}

/// The most recent `limit` days. ISO dates are shortened to `MM-DD`.
#[must_use]
pub fn daily_bars(totals: &DailyTotals, limit: usize) -> Vec<DayBars> {
    let days = totals.labels.len();
    (days.saturating_sub(limit)..days)
        .map(|index| {
            let raw = &totals.labels[index];
            let label = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|date| date.format("%m-%d").to_string())
                .unwrap_or_else(|_| raw.clone());
            DayBars {
                label,
                expenses: whole_units(totals.expenses.get(index).copied().unwrap_or(0.0)),
                income: whole_units(totals.income.get(index).copied().unwrap_or(0.0)),
            }
        })
        .collect()
}

pub fn render_bar_chart(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    data: &[(String, u64)],
    theme: &Theme,
) {
    let bars: Vec<Bar<'_>> = data
        .iter()
        .map(|(label, value)| Bar::default().label(label.as_str()).value(*value))
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(7)
        .bar_gap(2)
        .bar_style(Style::default().fg(theme.accent))
        .value_style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(theme.dim));

    let card = Card::new(title, theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);
    frame.render_widget(chart, inner);
}

/// Expenses and income side by side for each day.
pub fn render_daily_chart(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    days: &[DayBars],
    theme: &Theme,
) {
    let mut chart = BarChart::default()
        .bar_width(3)
        .bar_gap(0)
        .group_gap(2)
        .value_style(Style::default().fg(theme.text))
        .label_style(Style::default().fg(theme.dim));

    for day in days {
        let bars = [
            Bar::default()
                .value(day.expenses)
                .style(Style::default().fg(theme.negative)),
            Bar::default()
                .value(day.income)
                .style(Style::default().fg(theme.positive)),
        ];
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(day.label.clone()))
                .bars(&bars),
        );
    }

    let card = Card::new(title, theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);
    frame.render_widget(chart, inner);
}
