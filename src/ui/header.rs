use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Connection-ish state of the directory fetch, shown next to the title
fn fetch_status<'a>(loading: bool, error: Option<&'a str>) -> Span<'a> {
    if loading {
        Span::styled("🟡 Loading services...", Style::default().fg(Color::Yellow))
    } else if let Some(message) = error {
        Span::styled(format!("🔴 {}", message), Style::default().fg(Color::Red))
    } else {
        Span::styled("🟢 Online", Style::default().fg(Color::Green))
    }
}

/// Render the title bar at the top of the screen
pub fn render_header(
    f: &mut Frame,
    area: Rect,
    user_label: &str,
    signed_in: bool,
    loading: bool,
    error: Option<&str>,
) {
    let mut spans = vec![
        Span::styled(
            "ServiceFinder",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        fetch_status(loading, error),
        Span::raw(" | "),
    ];

    if signed_in {
        spans.push(Span::styled("User:", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {}", user_label)));
    } else {
        spans.push(Span::styled(
            "Guest (press i to sign in)",
            Style::default().fg(Color::Gray),
        ));
    }

    let paragraph = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).title("Local Services"));
    f.render_widget(paragraph, area);
}
