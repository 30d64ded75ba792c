use engine::{BudgetStatus, Money};
use ratatui::{
    style::{Modifier, Style},
    text::Span,
    widgets::Gauge,
};

use crate::ui::theme::Theme;

/// Amount colored by sign: income green, spending red.
#[must_use]
pub fn styled_amount(amount: f64, theme: &Theme) -> Span<'static> {
    let money = Money::from_major(amount);
    let color = if money.cents() > 0 {
        theme.positive
    } else if money.cents() < 0 {
        theme.negative
    } else {
        theme.text
    };
    Span::styled(money.to_string(), Style::default().fg(color))
}

#[must_use]
pub fn styled_amount_bold(amount: f64, theme: &Theme) -> Span<'static> {
    let span = styled_amount(amount, theme);
    let style = span.style.add_modifier(Modifier::BOLD);
    span.style(style)
}

/// Progress gauge for a budget, filled up to 100% and colored by level.
#[must_use]
pub fn budget_gauge(status: &BudgetStatus, label: String, theme: &Theme) -> Gauge<'static> {
    let ratio = (status.progress() / 100.0).clamp(0.0, 1.0);
    Gauge::default()
        .gauge_style(
            Style::default()
                .fg(theme.level(status.level))
                .bg(theme.surface),
        )
        .ratio(ratio)
        .label(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_color_follows_sign() {
        let theme = Theme::default();
        assert_eq!(styled_amount(12.5, &theme).style.fg, Some(theme.positive));
        assert_eq!(styled_amount(-3.0, &theme).style.fg, Some(theme.negative));
        assert_eq!(styled_amount(0.0, &theme).content, "$0.00");
    }
}
