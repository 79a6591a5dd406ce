//! Variables pane: the scope chain of the current step

use crate::memory::runtime_value::format_value;
use crate::memory::scope::{Binding, SlotStatus};
use crate::snapshot::ExecutionStep;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

fn binding_label(binding: Binding) -> &'static str {
    match binding {
        Binding::Var => "var",
        Binding::Let => "let",
        Binding::Const => "const",
        Binding::Function => "fn",
        Binding::Param => "param",
        Binding::Implicit => "global",
    }
}

/// Render every scope of the step, innermost first
pub fn render_variables_pane(
    frame: &mut Frame,
    area: Rect,
    step: Option<&ExecutionStep>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = super::pane_block(" Variables ", is_focused);
    let mut all_items: Vec<ListItem> = Vec::new();

    match step {
        None => {
            all_items.push(ListItem::new("(no trace)").style(Style::default().fg(DEFAULT_THEME.dim)));
        }
        Some(step) => {
            for scope in &step.scopes {
                all_items.push(ListItem::new(Line::from(vec![
                    Span::styled("▸ ", Style::default().fg(DEFAULT_THEME.marker)),
                    Span::styled(
                        format!("{} scope", scope.kind.label()),
                        Style::default()
                            .fg(DEFAULT_THEME.builtin)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!(" {}", scope.id), Style::default().fg(DEFAULT_THEME.dim)),
                ])));

                if scope.variables.is_empty() {
                    all_items.push(
                        ListItem::new("    (empty)").style(Style::default().fg(DEFAULT_THEME.dim)),
                    );
                }

                for var in &scope.variables {
                    let value_span = if var.status == SlotStatus::Tdz {
                        Span::styled(
                            var.display_value(),
                            Style::default()
                                .fg(DEFAULT_THEME.dim)
                                .add_modifier(Modifier::ITALIC),
                        )
                    } else {
                        Span::styled(format_value(&var.value, true), super::value_style(&var.value))
                    };

                    all_items.push(ListItem::new(Line::from(vec![
                        Span::styled(
                            format!("    {:<6}", binding_label(var.binding)),
                            Style::default().fg(DEFAULT_THEME.keyword),
                        ),
                        Span::styled(var.name.clone(), Style::default().fg(DEFAULT_THEME.text)),
                        Span::styled(" = ", Style::default().fg(DEFAULT_THEME.dim)),
                        value_span,
                    ])));
                }
            }
        }
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
