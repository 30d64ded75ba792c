use engine::Money;
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
        components::{card::Card, money::budget_gauge},
        theme::Theme,
    },
};

const ROW_HEIGHT: u16 = 2;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let card = Card::new("Budgets", &theme).focused(true);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if state.budgets.is_empty() {
        let text = if state.loading {
            "Loading…"
        } else {
            "No budgets yet. Create one with `tracker budgets add`."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
            inner,
        );
        return;
    }

    let (start, end) = window(state.budgets.len(), state.budget_offset, inner.height);
    let mut constraints = vec![Constraint::Length(ROW_HEIGHT); end - start];
    let overflow = start > 0 || end < state.budgets.len();
    if overflow {
        constraints.push(Constraint::Length(1));
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    if overflow {
        let text = format!(
            "{start} above · {} below  (↑↓ to scroll)",
            state.budgets.len() - end
        );
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
            rows[end - start],
        );
    }

    for (budget, row) in state.budgets[start..end].iter().zip(rows.iter()) {
        let status = engine::evaluate(budget);
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(*row);

        let mut header = vec![
            Span::styled(
                format!("{:<18}", budget.category),
                Style::default().fg(theme.text),
            ),
            Span::styled(
                format!(
                    "{} / {}",
                    Money::from_major(budget.current_spent),
                    Money::from_major(budget.limit_amount)
                ),
                Style::default().fg(theme.text_muted),
            ),
            Span::styled(
                format!("  {}", budget.period.as_str()),
                Style::default().fg(theme.dim),
            ),
        ];
        if !budget.is_active {
            header.push(Span::styled("  inactive", Style::default().fg(theme.dim)));
        }
        frame.render_widget(Paragraph::new(Line::from(header)), parts[0]);

        let label = format!("{} {}", status.label(), status.level.color_class());
        frame.render_widget(budget_gauge(&status, label, &theme), parts[1]);
    }
}

/// Range of budgets that fit in `height` rows starting near `offset`. One
/// line is kept for the overflow hint when not everything fits.
fn window(len: usize, offset: usize, height: u16) -> (usize, usize) {
    let all = (height / ROW_HEIGHT) as usize;
    let capacity = if len > all {
        (height.saturating_sub(1) / ROW_HEIGHT) as usize
    } else {
        all
    };
    let capacity = capacity.max(1);
    let start = offset.min(len.saturating_sub(capacity));
    (start, (start + capacity).min(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_fits() {
        assert_eq!(window(2, 0, 6), (0, 2));
        assert_eq!(window(3, 2, 6), (0, 3));
        assert_eq!(window(0, 0, 6), (0, 0));
    }

    #[test]
    fn overflow_leaves_room_for_the_hint() {
        // 6 lines hold 3 rows, but 5 budgets need the hint line.
        assert_eq!(window(5, 0, 6), (0, 2));
        assert_eq!(window(5, 1, 6), (1, 3));
        assert_eq!(window(5, 10, 6), (3, 5));
    }
}
