//! Listing Directory View
//!
//! Renders the current page either as a grid of cards or as a compact list.
//! Cards summarise reviews (average and count); list rows show the stored
//! rating field.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use servicefinder::api::Listing;
use servicefinder::logic::formatting::{format_phone_number, format_stars, truncate_text};
use servicefinder::logic::rating::{average_rating, is_top_rated, review_summary};
use servicefinder::model::DirectoryModel;
use servicefinder::ViewMode;

use super::layout::grid_columns;
use super::theme::category_theme;

/// Message shown instead of listings, if any
fn empty_message(dir: &DirectoryModel) -> Option<Vec<Line<'static>>> {
    if dir.loading {
        return Some(vec![Line::styled(
            "Loading services...",
            Style::default().fg(Color::Yellow),
        )]);
    }
    if let Some(error) = &dir.error {
        return Some(vec![
            Line::styled(error.clone(), Style::default().fg(Color::Red)),
            Line::raw(""),
            Line::raw("Press R to try again"),
        ]);
    }
    if dir.visible.is_empty() {
        let lines = if dir.listings.is_empty() {
            vec![
                Line::raw("No services listed yet."),
                Line::raw("Sign in and press a to add the first one."),
            ]
        } else {
            vec![
                Line::raw("No services match your filters."),
                Line::raw("Press x to clear them."),
            ]
        };
        return Some(lines);
    }
    None
}

/// Text lines of a grid card
fn card_lines(listing: &Listing, owned: bool, width: usize) -> Vec<Line<'static>> {
    let theme = category_theme(&listing.category);

    let mut heading = vec![Span::styled(
        format!("{} {}", theme.icon, theme.label),
        Style::default().fg(theme.color),
    )];
    if is_top_rated(listing) {
        heading.push(Span::raw(" "));
        heading.push(Span::styled(
            "Top Rated",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let average = average_rating(&listing.reviews).unwrap_or(0.0);
    let mut lines = vec![
        Line::from(heading),
        Line::from(vec![
            Span::styled(format_stars(average), Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            Span::styled(review_summary(listing), Style::default().fg(Color::Gray)),
        ]),
        Line::raw(format!("📍 {}", listing.city)),
    ];

    if !listing.description.is_empty() {
        lines.push(Line::styled(
            truncate_text(&listing.description, width.saturating_sub(4).max(10)),
            Style::default().fg(Color::Gray),
        ));
    }
    if owned {
        lines.push(Line::styled(
            "Your listing",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        ));
    }
    lines
}

/// Truncate and pad to a display-column width
fn pad_column(text: &str, width: usize) -> String {
    use unicode_width::UnicodeWidthStr;
    let text = if text.width() > width {
        truncate_text(text, width.saturating_sub(3))
    } else {
        text.to_string()
    };
    let padding = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(padding))
}

/// One line of the compact list view
fn list_row(listing: &Listing, owned: bool) -> Line<'static> {
    let theme = category_theme(&listing.category);
    let mut spans = vec![
        Span::styled(format!("{} ", theme.icon), Style::default().fg(theme.color)),
        Span::styled(
            pad_column(&listing.name, 28),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {:<12}", theme.label), Style::default().fg(theme.color)),
        Span::raw(format!(" {}", pad_column(&listing.city, 14))),
        Span::styled(format_stars(listing.rating), Style::default().fg(Color::Yellow)),
        Span::raw(format!(" {:.1}  ", listing.rating)),
        Span::styled(format_phone_number(&listing.phone), Style::default().fg(Color::Gray)),
    ];
    if owned {
        spans.push(Span::styled(" (yours)", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

fn panel_title(dir: &DirectoryModel) -> String {
    format!(
        " Services ({}) - page {}/{} ",
        dir.visible.len(),
        dir.pagination.page,
        dir.pagination.total_pages()
    )
}

fn is_owned(listing: &Listing, uid: Option<&str>) -> bool {
    uid.is_some_and(|uid| listing.is_owned_by(uid))
}

/// Render the current page of listings
pub fn render_listings(
    f: &mut Frame,
    area: Rect,
    dir: &DirectoryModel,
    view_mode: ViewMode,
    uid: Option<&str>,
) {
    let block = Block::default().borders(Borders::ALL).title(panel_title(dir));

    if let Some(lines) = empty_message(dir) {
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    match view_mode {
        ViewMode::List => render_list(f, area, dir, uid, block),
        ViewMode::Grid => {
            let inner = block.inner(area);
            f.render_widget(block, area);
            render_grid(f, inner, dir, uid);
        }
    }
}

fn render_list(f: &mut Frame, area: Rect, dir: &DirectoryModel, uid: Option<&str>, block: Block) {
    let items: Vec<ListItem> = dir
        .page_items()
        .iter()
        .map(|listing| ListItem::new(list_row(listing, is_owned(listing, uid))))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(dir.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_grid(f: &mut Frame, area: Rect, dir: &DirectoryModel, uid: Option<&str>) {
    let items = dir.page_items();
    let cols = grid_columns(area.width);
    let rows = items.len().div_ceil(cols).max(1);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    for (row_index, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
            .split(*row_area);

        for (col_index, cell) in cells.iter().enumerate() {
            let index = row_index * cols + col_index;
            let Some(listing) = items.get(index) else {
                break;
            };

            let selected = index == dir.selected;
            let border_style = if selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            let card = Paragraph::new(card_lines(listing, is_owned(listing, uid), cell.width as usize))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border_style)
                        .title(Span::styled(
                            format!(" {} ", truncate_text(&listing.name, cell.width.saturating_sub(6) as usize)),
                            Style::default().add_modifier(Modifier::BOLD),
                        )),
                )
                .wrap(Wrap { trim: true });
            f.render_widget(card, *cell);
        }
    }
}
