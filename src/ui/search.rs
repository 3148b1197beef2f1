//! Search Input UI
//!
//! Renders the search box with the typed term, match count and blinking cursor.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn search_title(active: bool, query: &str, match_count: usize, pending: bool) -> String {
    if active {
        if pending {
            " Search (typing…) - Enter to apply, Esc to cancel ".to_string()
        } else {
            format!(" Search ({} matches) - Esc to cancel ", match_count)
        }
    } else if !query.is_empty() {
        format!(" Search ({} matches) - / to edit, x to clear ", match_count)
    } else {
        " Search (/) ".to_string()
    }
}

/// Render search input box above the legend
///
/// `pending` is true while the debounce has not yet applied the typed term,
/// in which case the match count would be stale.
pub fn render_search_input(
    f: &mut Frame,
    area: Rect,
    query: &str,
    active: bool,
    match_count: usize,
    pending: bool,
) {
    let border_color = if active { Color::Cyan } else { Color::Gray };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(search_title(active, query, match_count, pending))
        .style(Style::default().fg(border_color));

    let cursor_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::SLOW_BLINK);

    let input_line = if active {
        Line::from(vec![
            Span::raw("Find: "),
            Span::raw(query),
            Span::styled("█", cursor_style),
        ])
    } else {
        Line::from(vec![Span::styled(
            format!("Find: {}", query),
            Style::default().fg(Color::Gray),
        )])
    };

    f.render_widget(Paragraph::new(vec![input_line]).block(block), area);
}
