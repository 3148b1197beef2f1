use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use servicefinder::logic::errors::ErrorType;
use servicefinder::model::Model;

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Plain-text summary of the directory position
fn directory_summary(model: &Model) -> String {
    let dir = &model.directory;
    let shown = dir.visible.len();
    let total = dir.listings.len();

    let count = if dir.filters.is_active() {
        format!("{} of {} services", shown, total)
    } else if total == 1 {
        "1 service".to_string()
    } else {
        format!("{} services", total)
    };

    format!(
        "Page {}/{} │ {} │ Sort: {} │ View: {:?}",
        dir.pagination.page,
        dir.pagination.total_pages(),
        count,
        dir.sort.label(),
        model.ui.view_mode,
    )
}

/// Render the bottom status bar
pub fn render_status_bar(f: &mut Frame, area: Rect, model: &Model, tick: usize) {
    let mut spans = vec![Span::raw(directory_summary(model))];

    if model.ui.is_busy() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("{} working", SPINNER[tick % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        ));
    }

    if let Some(kind) = model.ui.last_error {
        spans.push(Span::raw(" │ "));
        let color = match kind {
            ErrorType::NetworkError | ErrorType::ServerError => Color::Red,
            _ => Color::LightRed,
        };
        spans.push(Span::styled(
            format!("last error: {}", kind.tag()),
            Style::default().fg(color),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::Gray).bg(Color::Black));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_summary_before_fetch() {
        let model = Model::new(9, Duration::from_millis(300), false);
        let summary = directory_summary(&model);
        assert!(summary.starts_with("Page 1/1"), "got: {}", summary);
        assert!(summary.contains("0 services"), "got: {}", summary);
        assert!(summary.contains("Sort: Newest"), "got: {}", summary);
    }
}
