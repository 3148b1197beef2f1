//! Category styling
//!
//! Each category gets a colour and a short glyph; anything unrecognised falls
//! back to a neutral descriptor so stray stored values still render.

use ratatui::style::Color;

use servicefinder::api::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTheme {
    pub color: Color,
    pub icon: &'static str,
    pub label: &'static str,
}

pub const FALLBACK_THEME: CategoryTheme = CategoryTheme {
    color: Color::Gray,
    icon: "•",
    label: "Other",
};

pub fn theme_for(category: Category) -> CategoryTheme {
    let (color, icon) = match category {
        Category::Plumbing => (Color::Blue, "🔧"),
        Category::Electrical => (Color::Yellow, "⚡"),
        Category::Carpentry => (Color::Rgb(181, 101, 29), "🪚"),
        Category::Painting => (Color::Magenta, "🎨"),
        Category::Cleaning => (Color::Cyan, "🧹"),
        Category::Gardening => (Color::Green, "🌱"),
        Category::Landscaping => (Color::LightGreen, "🌳"),
        Category::Roofing => (Color::Red, "🏠"),
        Category::Hvac => (Color::LightBlue, "❄"),
        Category::Handyman => (Color::LightYellow, "🔨"),
    };
    CategoryTheme {
        color,
        icon,
        label: category.label(),
    }
}

/// Theme for a stored category string
pub fn category_theme(stored: &str) -> CategoryTheme {
    Category::parse(stored)
        .map(theme_for)
        .unwrap_or(FALLBACK_THEME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_category() {
        let theme = category_theme("plumbing");
        assert_eq!(theme.label, "Plumbing");
        assert_eq!(theme.color, Color::Blue);
    }

    #[test]
    fn test_stored_case_is_ignored() {
        assert_eq!(category_theme("HVAC"), theme_for(Category::Hvac));
    }

    #[test]
    fn test_unknown_category_falls_back() {
        assert_eq!(category_theme("welding"), FALLBACK_THEME);
        assert_eq!(category_theme(""), FALLBACK_THEME);
    }

    #[test]
    fn test_every_category_has_distinct_color() {
        let mut colors: Vec<_> = Category::ALL.iter().map(|c| format!("{:?}", theme_for(*c).color)).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), Category::ALL.len());
    }
}
