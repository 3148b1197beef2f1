//! Modal Dialogs
//!
//! Every dialog is a centered box drawn over a cleared area. Forms render one
//! row per field with the focused field highlighted and its validation
//! message underneath.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use servicefinder::api::{Category, Listing};
use servicefinder::logic::formatting::format_phone_number;
use servicefinder::logic::validators::{password_strength, password_strength_label};
use servicefinder::model::{
    AddListingModal, AuthModal, AuthTab, ConfirmDelete, FormState, ProfileModal, RateModal,
};

use super::layout::centered_rect;
use super::theme::{category_theme, theme_for};

const DIALOG_WIDTH: u16 = 64;

fn field_label(field: &str) -> &'static str {
    match field {
        "email" => "Email",
        "password" => "Password",
        "confirmPassword" => "Confirm password",
        "displayName" => "Display name",
        "phone" => "Phone",
        "photoURL" => "Photo URL",
        "name" => "Service name",
        "category" => "Category",
        "description" => "Description",
        "city" => "City",
        "image" => "Image file",
        _ => "Field",
    }
}

fn is_secret(field: &str) -> bool {
    matches!(field, "password" | "confirmPassword")
}

fn strength_color(score: u8) -> Color {
    match score {
        0 | 1 => Color::Red,
        2 => Color::Yellow,
        3 => Color::LightGreen,
        _ => Color::Green,
    }
}

/// Display text for a field value; secrets are masked, selectors get arrows
fn display_value(field: &str, value: &str) -> String {
    if is_secret(field) {
        return "•".repeat(value.chars().count());
    }
    if field == "category" {
        return match Category::parse(value) {
            Some(c) => {
                let theme = theme_for(c);
                format!("◀ {} {} ▶", theme.icon, theme.label)
            }
            None => "◀ Select a category ▶".to_string(),
        };
    }
    value.to_string()
}

/// One row per field plus an error row beneath any invalid field
fn form_lines(form: &FormState, show_strength: bool) -> Vec<Line<'static>> {
    let mut lines = vec![];

    for field in form.fields() {
        let focused = form.focused() == *field;
        let value = form.value(field);

        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let mut spans = vec![
            Span::styled(if focused { "> " } else { "  " }, label_style),
            Span::styled(format!("{:<18}", field_label(field)), label_style),
            Span::raw(display_value(field, value)),
        ];
        if focused && *field != "category" {
            spans.push(Span::styled(
                "█",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        lines.push(Line::from(spans));

        if show_strength && *field == "password" && !value.is_empty() {
            let score = password_strength(value);
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(20)),
                Span::styled(
                    format!("Strength: {}", password_strength_label(score)),
                    Style::default().fg(strength_color(score)),
                ),
            ]));
        }

        if let Some(message) = form.error(field) {
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(20)),
                Span::styled(message, Style::default().fg(Color::Red)),
            ]));
        }
    }
    lines
}

fn banner_lines(banner: Option<&str>, submitting: bool) -> Vec<Line<'static>> {
    let mut lines = vec![Line::raw("")];
    if submitting {
        lines.push(Line::styled("Working...", Style::default().fg(Color::Yellow)));
    } else if let Some(message) = banner {
        lines.push(Line::styled(
            message.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    lines
}

fn draw_dialog(f: &mut Frame, title: &str, border: Color, lines: Vec<Line<'static>>, width: u16) {
    let height = lines.len() as u16 + 2;
    let area = centered_rect(width, height, f.area());

    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title))
                .border_style(Style::default().fg(border)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black))
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn tab_line(active: AuthTab) -> Line<'static> {
    let mut spans = vec![];
    for tab in [AuthTab::SignIn, AuthTab::SignUp, AuthTab::ResetPassword] {
        let style = if tab == active {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", tab.title()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn auth_lines(modal: &AuthModal) -> Vec<Line<'static>> {
    let mut lines = vec![tab_line(modal.tab), Line::raw("")];

    if let Some(prompt) = modal.prompt {
        lines.push(Line::styled(prompt, Style::default().fg(Color::Yellow)));
        lines.push(Line::raw(""));
    }
    if modal.tab == AuthTab::ResetPassword {
        lines.push(Line::styled(
            "We'll email you a link to reset your password.",
            Style::default().fg(Color::Gray),
        ));
    }

    lines.extend(form_lines(modal.form(), modal.tab == AuthTab::SignUp));
    lines.extend(banner_lines(modal.banner.as_deref(), modal.is_submitting()));
    lines
}

pub fn render_auth_dialog(f: &mut Frame, modal: &AuthModal) {
    draw_dialog(f, modal.tab.title(), Color::Cyan, auth_lines(modal), DIALOG_WIDTH);
}

fn add_listing_lines(modal: &AddListingModal) -> Vec<Line<'static>> {
    let mut lines = form_lines(&modal.form, false);
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Image: path to a JPEG, PNG, GIF or WebP under 5MB (optional)",
        Style::default().fg(Color::Gray),
    ));
    lines.extend(banner_lines(modal.banner.as_deref(), modal.form.submitting));
    lines
}

pub fn render_add_listing_dialog(f: &mut Frame, modal: &AddListingModal) {
    draw_dialog(f, "Add Your Service", Color::Green, add_listing_lines(modal), 72);
}

fn rate_lines(modal: &RateModal) -> Vec<Line<'static>> {
    let stars: Vec<Span> = (1..=5u8)
        .map(|n| {
            if n <= modal.stars {
                Span::styled("★ ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                Span::styled("☆ ", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();

    let mut lines = vec![
        Line::raw(format!("How was {}?", modal.listing_name)),
        Line::raw(""),
        Line::from(stars),
        Line::raw(format!("{} / 5", modal.stars)),
    ];
    lines.extend(banner_lines(None, modal.submitting));
    lines
}

pub fn render_rate_dialog(f: &mut Frame, modal: &RateModal) {
    draw_dialog(f, "Rate Service", Color::Yellow, rate_lines(modal), 48);
}

fn contact_lines(listing: &Listing) -> Vec<Line<'static>> {
    let theme = category_theme(&listing.category);
    let key = |label: &'static str| Span::styled(format!("{:<10}", label), Style::default().fg(Color::Yellow));

    let mut lines = vec![
        Line::from(vec![
            Span::styled(listing.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(format!("{} {}", theme.icon, theme.label), Style::default().fg(theme.color)),
        ]),
        Line::raw(""),
        Line::from(vec![key("Phone"), Span::raw(format_phone_number(&listing.phone))]),
        Line::from(vec![key("Email"), Span::raw(listing.email.clone())]),
        Line::from(vec![key("City"), Span::raw(listing.city.clone())]),
    ];
    if !listing.description.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(listing.description.clone(), Style::default().fg(Color::Gray)));
    }
    lines
}

pub fn render_contact_dialog(f: &mut Frame, listing: &Listing) {
    draw_dialog(f, "Contact", Color::Blue, contact_lines(listing), DIALOG_WIDTH);
}

pub fn render_profile_dialog(f: &mut Frame, modal: &ProfileModal) {
    let mut lines = form_lines(&modal.form, false);
    lines.extend(banner_lines(modal.banner.as_deref(), modal.form.submitting));
    draw_dialog(f, "Edit Profile", Color::Cyan, lines, DIALOG_WIDTH);
}

/// Render the delete confirmation dialog
pub fn render_delete_confirmation(f: &mut Frame, confirm: &ConfirmDelete) {
    let lines = vec![
        Line::raw("Delete this service listing?"),
        Line::raw(""),
        Line::styled(confirm.listing_name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Line::raw(""),
        Line::styled("WARNING: This action cannot be undone!", Style::default().fg(Color::Red)),
        Line::raw(""),
        Line::raw("Continue? (y/n)"),
    ];
    draw_dialog(f, "Confirm Delete", Color::Red, lines, 50);
}

#[cfg(test)]
mod tests {
    use super::*;
    use servicefinder::model::SIGN_UP_FIELDS;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_passwords_are_masked() {
        assert_eq!(display_value("password", "hunter2"), "•••••••");
        assert_eq!(display_value("email", "a@b.co"), "a@b.co");
    }

    #[test]
    fn test_category_selector() {
        assert_eq!(display_value("category", ""), "◀ Select a category ▶");
        assert!(display_value("category", "hvac").contains("HVAC"));
    }

    #[test]
    fn test_sign_up_shows_strength_and_errors() {
        let mut form = FormState::new(&SIGN_UP_FIELDS);
        form.set("password", "abcdef");
        form.set_errors([("email", "Please enter a valid email address")].into());

        let rendered = text(&form_lines(&form, true));
        assert!(rendered.contains("Strength: Weak"), "got: {}", rendered);
        assert!(rendered.contains("Please enter a valid email address"), "got: {}", rendered);
    }

    #[test]
    fn test_auth_prompt_and_banner() {
        let mut modal = AuthModal::new(AuthTab::SignIn, Some("Sign in to rate this service"));
        modal.banner = Some("Incorrect password".into());
        let rendered = text(&auth_lines(&modal));
        assert!(rendered.contains("Sign in to rate this service"));
        assert!(rendered.contains("Incorrect password"));
    }

    #[test]
    fn test_rate_shows_selected_stars() {
        let listing: Listing =
            serde_json::from_value(serde_json::json!({ "id": "a", "name": "Joe", "category": "roofing" })).unwrap();
        let mut modal = RateModal::new(&listing);
        modal.adjust(-2);
        let rendered = text(&rate_lines(&modal));
        assert!(rendered.contains("★ ★ ★ ☆ ☆"), "got: {}", rendered);
        assert!(rendered.contains("3 / 5"));
    }

    #[test]
    fn test_contact_formats_phone() {
        let listing: Listing = serde_json::from_value(serde_json::json!({
            "id": "a",
            "name": "Joe",
            "category": "plumbing",
            "phone": "27821234567",
            "email": "joe@example.com"
        }))
        .unwrap();
        let rendered = text(&contact_lines(&listing));
        assert!(rendered.contains("+27 82 123 4567"), "got: {}", rendered);
        assert!(rendered.contains("joe@example.com"));
    }
}
