//! Source code pane rendering with syntax highlighting
//!
//! This module renders the source code pane, which displays the program being
//! stepped through with basic syntax highlighting and execution indicators.
//!
//! # Features
//!
//! - Syntax highlighting for keywords, literals, strings and comments
//! - Current line highlighting, in red when the step is the error step
//! - Breakpoint dots in the gutter
//! - The current line stays at a fixed row while stepping
//!
//! # Rendering
//!
//! The pane uses a simple character-by-character tokenizer to apply syntax
//! highlighting styles without requiring the real lexer.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Simple syntax highlighting for one line of source
fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Line comments
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            if !current_word.is_empty() {
                spans.push(Span::styled(
                    current_word.clone(),
                    get_keyword_style(&current_word, false),
                ));
                current_word.clear();
            }
            spans.push(Span::styled(
                chars[i..].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.dim),
            ));
            break;
        }

        // Strings, either quote
        if c == '"' || c == '\'' {
            if !current_word.is_empty() {
                spans.push(Span::styled(
                    current_word.clone(),
                    get_keyword_style(&current_word, false),
                ));
                current_word.clear();
            }
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                if chars[end] == '\\' {
                    end += 2;
                } else {
                    end += 1;
                }
            }
            let end = (end + 1).min(chars.len());
            spans.push(Span::styled(
                chars[i..end].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        // Delimiters end the current word
        if !c.is_alphanumeric() && c != '_' && c != '$' {
            if !current_word.is_empty() {
                let is_func = c == '(';
                let style = get_keyword_style(&current_word, is_func);
                spans.push(Span::styled(current_word.clone(), style));
                current_word.clear();
            }

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.accent),
                _ => Style::default().fg(DEFAULT_THEME.text),
            };

            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    if !current_word.is_empty() {
        let style = get_keyword_style(&current_word, false);
        spans.push(Span::styled(current_word, style));
    }

    Line::from(spans)
}

fn get_keyword_style(word: &str, is_function: bool) -> Style {
    match word {
        "var" | "let" | "const" | "function" | "return" | "if" | "else" | "while" | "for"
        | "do" | "break" | "continue" | "typeof" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "true" | "false" | "null" | "undefined" | "NaN" | "Infinity" => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        "console" | "Math" => Style::default().fg(DEFAULT_THEME.builtin),
        _ if word.chars().next().is_some_and(|c| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ => {
            if is_function {
                Style::default().fg(DEFAULT_THEME.function)
            } else {
                Style::default().fg(DEFAULT_THEME.text)
            }
        }
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the current line is pinned to; `None` until first render
    pub target_line_row: Option<usize>,
}

/// Data needed to render the source pane
pub struct SourceRenderData<'a> {
    pub source_code: &'a str,
    /// 1-based; 0 when there is no step to show
    pub current_line: usize,
    pub is_error: bool,
    pub breakpoints: &'a [usize],
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    data: SourceRenderData,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let block = super::pane_block(" Source ", is_focused);

    let lines: Vec<&str> = data.source_code.lines().collect();
    let total_lines = lines.len();

    // Account for borders (2), min 1
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    // Keep the current line at the target visual row
    if data.current_line > 0 && data.current_line <= total_lines {
        scroll_state.offset = (data.current_line - 1).saturating_sub(target_row);
    }
    super::clamp_scroll(&mut scroll_state.offset, total_lines, visible_height);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == data.current_line;
            let has_breakpoint = data.breakpoints.contains(&line_num);

            let gutter = if has_breakpoint {
                Span::styled("●", Style::default().fg(DEFAULT_THEME.breakpoint))
            } else {
                Span::raw(" ")
            };

            let (num_style, content_style) = if is_current && data.is_error {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                    Style::default()
                        .bg(DEFAULT_THEME.error)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            } else if is_current {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.marker)
                        .add_modifier(Modifier::BOLD),
                    Style::default().bg(DEFAULT_THEME.current_step_bg),
                )
            } else {
                (Style::default().fg(DEFAULT_THEME.dim), Style::default())
            };

            let mut content_line = highlight_source_code(line);
            if is_current && data.is_error {
                for span in &mut content_line.spans {
                    span.style = content_style;
                }
            } else if is_current {
                for span in &mut content_line.spans {
                    span.style = span.style.patch(content_style);
                }
            }

            let marker = if is_current { "▶" } else { " " };
            let mut final_spans = vec![
                gutter,
                Span::styled(format!("{:4} {}", line_num, marker), num_style),
                Span::raw(" "),
            ];
            final_spans.extend(content_line.spans);

            Line::from(final_spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_keeps_text() {
        let line = "let s = 'a\\'b'; // note";
        let rendered: String = highlight_source_code(line)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(rendered, line);
    }

    #[test]
    fn test_keyword_styles() {
        assert_eq!(
            get_keyword_style("let", false).fg,
            Some(DEFAULT_THEME.keyword)
        );
        assert_eq!(get_keyword_style("add", true).fg, Some(DEFAULT_THEME.function));
        assert_eq!(get_keyword_style("42", false).fg, Some(DEFAULT_THEME.number));
    }
}
