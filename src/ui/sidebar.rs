//! Filter Sidebar
//!
//! Shows the active filter criteria and the key that cycles each one.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use servicefinder::model::DirectoryModel;

use super::theme::theme_for;

fn min_rating_label(min_rating: f64) -> String {
    if min_rating > 0.0 {
        format!("{:.1}+ ★", min_rating)
    } else {
        "Any".to_string()
    }
}

fn row(key: &'static str, name: &'static str, value: Span<'static>) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::styled(key, Style::default().fg(Color::Yellow)),
            Span::styled(format!(" {}", name), Style::default().fg(Color::Gray)),
        ]),
        Line::from(vec![Span::raw("  "), value]),
    ]
}

fn build_sidebar_lines(dir: &DirectoryModel) -> Vec<Line<'static>> {
    let active = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let idle = Style::default();

    let category = match dir.filters.category {
        Some(c) => {
            let theme = theme_for(c);
            Span::styled(
                format!("{} {}", theme.icon, theme.label),
                Style::default().fg(theme.color).add_modifier(Modifier::BOLD),
            )
        }
        None => Span::styled("All Categories", idle),
    };

    let city = match &dir.filters.city {
        Some(city) => Span::styled(city.clone(), active),
        None => Span::styled("All Cities", idle),
    };

    let rating = Span::styled(
        min_rating_label(dir.filters.min_rating),
        if dir.filters.min_rating > 0.0 { active } else { idle },
    );

    let search = if dir.filters.search.is_empty() {
        Span::styled("-", idle)
    } else {
        Span::styled(format!("\"{}\"", dir.filters.search), active)
    };

    let mut lines = vec![];
    lines.extend(row("c", "Category", category));
    lines.extend(row("t", "City", city));
    lines.extend(row("m", "Min rating", rating));
    lines.extend(row("s", "Sort", Span::raw(dir.sort.label().to_string())));
    lines.extend(row("/", "Search", search));

    if dir.filters.is_active() {
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("x", Style::default().fg(Color::Yellow)),
            Span::raw(" Clear filters"),
        ]));
    }
    lines
}

pub fn render_sidebar(f: &mut Frame, area: Rect, dir: &DirectoryModel) {
    let paragraph = Paragraph::new(build_sidebar_lines(dir))
        .block(Block::default().borders(Borders::ALL).title(" Filters "))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
