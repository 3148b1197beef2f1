use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use servicefinder::update::TopModal;

/// What the legend needs to know about the current focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegendContext {
    pub vim_mode: bool,
    pub search_mode: bool,
    pub has_search_query: bool,
    pub signed_in: bool,
    pub modal: Option<TopModal>,
}

fn key(label: &'static str) -> Span<'static> {
    Span::styled(label, Style::default().fg(Color::Yellow))
}

fn push(spans: &mut Vec<Span<'static>>, keys: &[(&'static str, &'static str)]) {
    for (k, action) in keys {
        spans.push(key(k));
        spans.push(Span::raw(*action));
    }
}

/// Build hotkey spans (extracted for testability)
fn build_hotkey_spans(ctx: LegendContext) -> Vec<Span<'static>> {
    let mut spans = vec![];

    if let Some(modal) = ctx.modal {
        match modal {
            TopModal::ConfirmDelete => push(&mut spans, &[("y", ":Delete  "), ("n", ":Keep  ")]),
            TopModal::Rate => push(
                &mut spans,
                &[("1-5", ":Stars  "), ("←/→", ":Adjust  "), ("Enter", ":Submit  ")],
            ),
            TopModal::Contact => push(&mut spans, &[("Enter", ":Close  ")]),
            TopModal::Auth => push(
                &mut spans,
                &[
                    ("Tab", ":Next field  "),
                    ("^T", ":Switch tab  "),
                    ("Enter", ":Submit  "),
                ],
            ),
            TopModal::AddListing => push(
                &mut spans,
                &[
                    ("Tab", ":Next field  "),
                    ("←/→", ":Category  "),
                    ("Enter", ":Submit  "),
                ],
            ),
            TopModal::Profile => push(
                &mut spans,
                &[("Tab", ":Next field  "), ("Enter", ":Save  ")],
            ),
        }
        push(&mut spans, &[("Esc", ":Close")]);
        return spans;
    }

    if ctx.search_mode {
        push(
            &mut spans,
            &[("Enter", ":Apply  "), ("Esc", ":Cancel Search")],
        );
        return spans;
    }

    if ctx.vim_mode {
        push(
            &mut spans,
            &[("jk", ":Nav  "), ("hl", ":Page  "), ("gg/G", ":First/Last  ")],
        );
    } else {
        push(&mut spans, &[("↑/↓", ":Nav  "), ("←/→", ":Page  ")]);
    }

    push(
        &mut spans,
        &[
            ("/", ":Search  "),
            ("c", ":Category  "),
            ("t", ":City  "),
            ("m", ":Min rating  "),
            ("s", ":Sort  "),
            ("v", ":View  "),
        ],
    );

    if ctx.has_search_query {
        push(&mut spans, &[("x", ":Clear filters  ")]);
    }

    push(&mut spans, &[("Enter", ":Contact  "), ("r", ":Rate  ")]);

    if ctx.signed_in {
        push(
            &mut spans,
            &[
                ("a", ":Add  "),
                ("d", ":Delete  "),
                ("p", ":Profile  "),
                ("o", ":Sign out  "),
            ],
        );
    } else {
        push(&mut spans, &[("i", ":Sign in  ")]);
    }

    push(&mut spans, &[("R", ":Refresh  "), ("q", ":Quit")]);
    spans
}

/// Build the legend paragraph (reusable for both rendering and height calculation)
pub fn build_legend_paragraph(ctx: LegendContext) -> Paragraph<'static> {
    Paragraph::new(vec![Line::from(build_hotkey_spans(ctx))])
        .block(Block::default().borders(Borders::ALL).title("Hotkeys"))
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: false })
}

pub fn render_legend(f: &mut Frame, area: Rect, ctx: LegendContext) {
    f.render_widget(build_legend_paragraph(ctx), area);
}

/// Calculate required height for legend based on terminal width and content
pub fn calculate_legend_height(terminal_width: u16, ctx: LegendContext) -> u16 {
    // Count lines without the block; line_count() miscounts with borders attached
    let paragraph = Paragraph::new(vec![Line::from(build_hotkey_spans(ctx))])
        .wrap(Wrap { trim: false });
    let line_count = paragraph.line_count(terminal_width.saturating_sub(2));
    (line_count as u16).saturating_add(2).max(3)
}
