//! Console output pane rendering

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the console output accumulated up to the current step.
///
/// `fresh` is the number of trailing lines printed by the current step itself;
/// they are highlighted.
pub fn render_console_pane(
    frame: &mut Frame,
    area: Rect,
    lines: &[String],
    fresh: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = super::pane_block(" Console ", is_focused);

    if lines.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.dim));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let first_fresh = lines.len().saturating_sub(fresh);
    let all_items: Vec<ListItem> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let color = if i >= first_fresh {
                DEFAULT_THEME.ok
            } else {
                DEFAULT_THEME.text
            };
            ListItem::new(line.as_str()).style(Style::default().fg(color))
        })
        .collect();

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    super::clamp_scroll(scroll_offset, all_items.len(), visible_height);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
