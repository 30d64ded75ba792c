pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Screen, Section};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    match state.screen {
        Screen::Login => screens::login::render(frame, area, state),
        Screen::Dashboard => render_shell(frame, area, state),
    }
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(2), // Tabs
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(
        frame,
        layout[1],
        state.section,
        state.alerts.unread,
        &theme,
    );

    match state.section {
        Section::Budgets => screens::budgets::render(frame, layout[2], state),
        Section::Alerts => screens::alerts::render(frame, layout[2], state),
        Section::Summary => screens::summary::render(frame, layout[2], state),
    }

    render_bottom_bar(frame, layout[3], state, &theme);
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state
        .user
        .as_ref()
        .map(|user| user.username.as_str())
        .unwrap_or("-");
    let refresh = state
        .last_refresh
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut spans = vec![
        Span::styled("User", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {user}  ")),
        Span::styled("Period", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.period)),
        Span::styled("Refresh", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {refresh}  ")),
    ];

    if state.alerts.unread > 0 {
        spans.push(Span::styled(
            format!("● {} unread", state.alerts.unread),
            Style::default()
                .fg(theme.negative)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw("  "));
    }
    if state.loading {
        spans.push(Span::styled("loading…", Style::default().fg(theme.dim)));
    } else if let Some(error) = &state.load_error {
        spans.push(Span::styled(error.clone(), Style::default().fg(theme.error)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = components::tabs::tab_shortcuts(theme);

    let separator = || Span::styled("  │  ", Style::default().fg(theme.border));
    parts.push(separator());
    parts.push(Span::styled("r", Style::default().fg(theme.accent)));
    parts.push(Span::raw(" refresh  "));
    parts.push(Span::styled("p", Style::default().fg(theme.accent)));
    parts.push(Span::raw(" period"));

    if state.section == Section::Budgets {
        parts.push(separator());
        parts.push(Span::styled("↑↓", Style::default().fg(theme.accent)));
        parts.push(Span::raw(" scroll"));
    }
    if state.section == Section::Alerts {
        parts.push(separator());
        parts.push(Span::styled("↑↓", Style::default().fg(theme.accent)));
        parts.push(Span::raw(" select  "));
        parts.push(Span::styled("m", Style::default().fg(theme.accent)));
        parts.push(Span::raw(" mark read"));
    }

    parts.push(separator());
    parts.push(Span::styled("l", Style::default().fg(theme.accent)));
    parts.push(Span::raw(" logout  "));
    parts.push(Span::styled("q", Style::default().fg(theme.accent)));
    parts.push(Span::raw(" quit"));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
