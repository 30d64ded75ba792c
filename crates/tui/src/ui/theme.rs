use engine::BudgetLevel;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub surface: Color,
    pub text: Color,
    pub text_muted: Color,
    pub dim: Color,
    pub accent: Color,
    pub border: Color,
    pub border_focused: Color,
    pub positive: Color,
    pub warning: Color,
    pub negative: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface: Color::Rgb(20, 26, 32),
            text: Color::Rgb(220, 220, 220),
            text_muted: Color::Rgb(160, 160, 160),
            dim: Color::Rgb(120, 120, 120),
            accent: Color::Rgb(80, 160, 160),
            border: Color::Rgb(60, 70, 80),
            border_focused: Color::Rgb(80, 160, 160),
            positive: Color::Rgb(90, 180, 110),
            warning: Color::Rgb(220, 170, 60),
            negative: Color::Rgb(210, 90, 90),
            error: Color::Rgb(200, 80, 80),
        }
    }
}

impl Theme {
    /// Color of a budget in the given state.
    pub fn level(&self, level: BudgetLevel) -> Color {
        match level {
            BudgetLevel::Ok => self.positive,
            BudgetLevel::Warning => self.warning,
            BudgetLevel::Exceeded => self.negative,
        }
    }
}
