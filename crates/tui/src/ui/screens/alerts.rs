use api_types::alert::{Alert, AlertType};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    ui::{components::card::Card, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let title = format!("Alerts · {} unread", state.alerts.unread);
    let card = Card::new(&title, &theme).focused(true);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let ordered = state.alerts_in_display_order();
    if ordered.is_empty() {
        let text = match state.alerts.fetched_at {
            Some(_) => "No alerts.",
            None => "Waiting for the first poll…",
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
            inner,
        );
        return;
    }

    let mut lines = Vec::new();
    let mut current: Option<AlertType> = None;
    for (index, alert) in ordered.iter().enumerate() {
        if current != Some(alert.alert_type) {
            current = Some(alert.alert_type);
            let (heading, color) = match alert.alert_type {
                AlertType::Exceeded => ("Exceeded", theme.negative),
                AlertType::Warning => ("Warning", theme.warning),
            };
            if !lines.is_empty() {
                lines.push(Line::raw(""));
            }
            lines.push(Line::from(Span::styled(
                heading,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(alert_line(alert, index == state.selected_alert, &theme));
    }

    // Keep the selection visible.
    let selected_line = lines_before_selection(&ordered, state.selected_alert);
    let scroll = selected_line.saturating_sub(inner.height.saturating_sub(1) as usize) as u16;
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn alert_line(alert: &Alert, selected: bool, theme: &Theme) -> Line<'static> {
    let marker = if alert.is_read { "  " } else { "● " };
    let mut style = if alert.is_read {
        Style::default().fg(theme.dim)
    } else {
        Style::default().fg(theme.text)
    };
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }

    Line::from(vec![
        Span::styled(marker, Style::default().fg(theme.accent)),
        Span::styled(
            format!(
                "{}  {:>6.1}%  {}",
                alert.created_at.format("%m-%d %H:%M"),
                alert.percentage,
                alert.message
            ),
            style,
        ),
    ])
}

/// Rendered line index of the selected alert, counting group headings and
/// the blank line between groups.
fn lines_before_selection(ordered: &[&Alert], selected: usize) -> usize {
    let mut line = 0;
    let mut current = None;
    for (index, alert) in ordered.iter().enumerate() {
        if current != Some(alert.alert_type) {
            if current.is_some() {
                line += 1;
            }
            current = Some(alert.alert_type);
            line += 1;
        }
        if index == selected {
            return line;
        }
        line += 1;
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn alert(alert_type: AlertType) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            budget_id: None,
            alert_type,
            message: "Budget alert".to_string(),
            percentage: 90.0,
            is_read: false,
            created_at: NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn selection_line_skips_headings() {
        let exceeded = alert(AlertType::Exceeded);
        let warning_a = alert(AlertType::Warning);
        let warning_b = alert(AlertType::Warning);
        let ordered = vec![&exceeded, &warning_a, &warning_b];

        assert_eq!(lines_before_selection(&ordered, 0), 1);
        // heading, exceeded, blank, heading, warning_a
        assert_eq!(lines_before_selection(&ordered, 1), 4);
        assert_eq!(lines_before_selection(&ordered, 2), 5);
    }
}
