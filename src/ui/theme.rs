//! Colors of the stepper UI, by the role a span plays rather than by hue

use crate::snapshot::RunStatus;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub text: Color,
    pub dim: Color,
    /// Brackets and the paused badge
    pub accent: Color,
    /// Scope and frame markers, the playing badge
    pub marker: Color,
    pub ok: Color,
    pub error: Color,

    // Source highlighting
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub function: Color,
    /// `console`, `Math` and scope headers
    pub builtin: Color,
    pub breakpoint: Color,
    pub current_step_bg: Color,

    pub return_value: Color,
    pub border_focused: Color,
    pub border: Color,
}

impl Theme {
    /// Badge color for a run status
    pub fn status_color(&self, status: RunStatus) -> Color {
        match status {
            RunStatus::Error => self.error,
            RunStatus::Completed => self.ok,
            RunStatus::Paused | RunStatus::Running => self.accent,
            RunStatus::Idle => self.dim,
        }
    }
}

pub const DEFAULT_THEME: Theme = Theme {
    text: Color::Rgb(205, 214, 244),
    dim: Color::Rgb(108, 112, 134),
    accent: Color::Rgb(137, 180, 250),
    marker: Color::Rgb(250, 179, 135),
    ok: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),

    keyword: Color::Rgb(203, 166, 247),
    string: Color::Rgb(166, 227, 161),
    number: Color::Rgb(250, 179, 135),
    function: Color::Rgb(249, 226, 175),
    builtin: Color::Rgb(148, 226, 213),
    breakpoint: Color::Rgb(235, 111, 146),
    current_step_bg: Color::Rgb(49, 50, 68),

    return_value: Color::Rgb(245, 194, 231),
    border_focused: Color::Rgb(249, 226, 175),
    border: Color::Rgb(88, 91, 112),
};
