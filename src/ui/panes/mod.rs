//! TUI pane rendering modules
//!
//! This module provides the rendering logic for all visual panes in the TUI,
//! organized by responsibility for maintainability.
//!
//! # Pane Modules
//!
//! - [`source`]: Source code with syntax highlighting, current line and breakpoints
//! - [`variables`]: The scope chain of the current step, innermost first
//! - [`stack`]: Call frames with their parameters and locals
//! - [`console`]: Console output accumulated up to the current step
//! - [`status`]: Status bar with keybindings and run state
//!
//! Every pane renders from an [`ExecutionStep`](crate::snapshot::ExecutionStep)
//! or the trace itself; none of them touch the interpreter.

pub mod console;
pub mod source;
pub mod stack;
pub mod status;
pub mod variables;

pub use console::render_console_pane;
pub use source::{render_source_pane, SourceRenderData, SourceScrollState};
pub use stack::render_stack_pane;
pub use status::{render_status_bar, StatusRenderData};
pub use variables::render_variables_pane;

use crate::memory::runtime_value::{Primitive, RuntimeValue};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    widgets::{Block, Borders},
};

/// Bordered block whose border is highlighted when the pane has focus
pub(crate) fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Color a value by its kind
pub(crate) fn value_style(value: &RuntimeValue) -> Style {
    let color = match value {
        RuntimeValue::Primitive(Primitive::String(_)) => DEFAULT_THEME.string,
        RuntimeValue::Primitive(Primitive::Number(_) | Primitive::Boolean(_)) => {
            DEFAULT_THEME.number
        }
        RuntimeValue::Primitive(Primitive::Undefined | Primitive::Null) => DEFAULT_THEME.dim,
        RuntimeValue::Function { .. } => DEFAULT_THEME.function,
        RuntimeValue::Array { .. }
        | RuntimeValue::Object { .. }
        | RuntimeValue::Circular { .. }
        | RuntimeValue::Elided { .. } => DEFAULT_THEME.text,
    };
    Style::default().fg(color)
}

/// Clamp a scroll offset so the last page stays full
pub(crate) fn clamp_scroll(offset: &mut usize, total_items: usize, visible_height: usize) {
    if total_items > visible_height {
        *offset = (*offset).min(total_items - visible_height);
    } else {
        *offset = 0;
    }
}
