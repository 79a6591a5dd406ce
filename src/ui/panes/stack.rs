//! Stack pane rendering with call frames
//!
//! Each frame is displayed as a header line (frame number, function name and
//! the line it was called from) followed by its parameters and locals. The
//! innermost frame is drawn first; the global frame is implicit.

use crate::memory::runtime_value::{format_value, RuntimeValue};
use crate::snapshot::{ExecutionStep, StepType};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

fn value_line(label: &str, name: &str, value: &RuntimeValue) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("    {:<6}", label),
            Style::default().fg(DEFAULT_THEME.dim),
        ),
        Span::styled(name.to_string(), Style::default().fg(DEFAULT_THEME.text)),
        Span::styled(" = ", Style::default().fg(DEFAULT_THEME.dim)),
        Span::styled(format_value(value, true), super::value_style(value)),
    ]))
}

/// Render the stack pane
pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    step: Option<&ExecutionStep>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = super::pane_block(" Call Stack ", is_focused);
    let frames = step.map(|s| s.call_stack.as_slice()).unwrap_or_default();
    let mut all_items = Vec::new();

    if frames.is_empty() {
        all_items.push(ListItem::new("(global)").style(Style::default().fg(DEFAULT_THEME.dim)));
    }

    for (depth, stack_frame) in frames.iter().enumerate().rev() {
        let is_top = depth + 1 == frames.len();
        let name_style = if is_top {
            Style::default()
                .fg(DEFAULT_THEME.function)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DEFAULT_THEME.function)
        };

        all_items.push(ListItem::new(Line::from(vec![
            Span::styled("▸ ", Style::default().fg(DEFAULT_THEME.marker)),
            Span::styled(
                format!("Frame {} ", depth),
                Style::default().fg(DEFAULT_THEME.dim),
            ),
            Span::styled("│ ", Style::default().fg(DEFAULT_THEME.dim)),
            Span::styled(format!("{}()", stack_frame.function_name), name_style),
            Span::styled(
                format!("  ↪ line {}", stack_frame.caller_line),
                Style::default().fg(DEFAULT_THEME.dim),
            ),
        ])));

        for (name, value) in &stack_frame.params {
            all_items.push(value_line("param", name, value));
        }
        for (name, value) in &stack_frame.locals {
            all_items.push(value_line("local", name, value));
        }
    }

    // A return step shows the value leaving the top frame
    if let Some(step) = step.filter(|s| s.step_type == StepType::Return) {
        all_items.push(ListItem::new(Line::from(vec![Span::styled(
            format!("  ⮐ {}", step.description),
            Style::default()
                .fg(DEFAULT_THEME.return_value)
                .add_modifier(Modifier::BOLD),
        )])));
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    super::clamp_scroll(scroll_offset, all_items.len(), visible_height);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
