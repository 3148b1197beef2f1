use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the filter sidebar
pub const SIDEBAR_WIDTH: u16 = 26;

/// Layout information for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutInfo {
    /// Top bar: app name and signed-in user
    pub header_area: Rect,
    /// Filter sidebar (hidden on narrow terminals)
    pub sidebar_area: Option<Rect>,
    /// Listing grid or list
    pub listings_area: Rect,
    /// Search input area (if visible)
    pub search_area: Option<Rect>,
    /// Hotkey legend area (full width)
    pub legend_area: Rect,
    /// Bottom status bar area
    pub status_area: Rect,
}

/// Calculate the screen layout for all UI components
pub fn calculate_layout(terminal_size: Rect, search_visible: bool, legend_height: u16) -> LayoutInfo {
    let search_height = if search_visible { 3 } else { 0 };

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Header
            Constraint::Min(3),                // Sidebar + listings
            Constraint::Length(search_height), // Search input (3 lines when visible, 0 when hidden)
            Constraint::Length(legend_height), // Legend
            Constraint::Length(1),             // Status bar
        ])
        .split(terminal_size);

    let content = main_chunks[1];
    let (sidebar_area, listings_area) = if content.width >= SIDEBAR_WIDTH * 3 {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(content);
        (Some(cols[0]), cols[1])
    } else {
        (None, content)
    };

    LayoutInfo {
        header_area: main_chunks[0],
        sidebar_area,
        listings_area,
        search_area: search_visible.then_some(main_chunks[2]),
        legend_area: main_chunks[3],
        status_area: main_chunks[4],
    }
}

/// Number of card columns that fit in `width`
pub fn grid_columns(width: u16) -> usize {
    (width / 32).clamp(1, 3) as usize
}

/// Center a `width` x `height` box in `area`, shrinking it to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_terminal_shows_sidebar() {
        let info = calculate_layout(Rect::new(0, 0, 120, 40), false, 2);
        let sidebar = info.sidebar_area.unwrap();
        assert_eq!(sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(info.listings_area.width, 120 - SIDEBAR_WIDTH);
        assert_eq!(info.search_area, None);
        assert_eq!(info.status_area.height, 1);
    }

    #[test]
    fn test_narrow_terminal_hides_sidebar() {
        let info = calculate_layout(Rect::new(0, 0, 60, 30), true, 2);
        assert!(info.sidebar_area.is_none());
        assert_eq!(info.listings_area.width, 60);
        assert_eq!(info.search_area.map(|a| a.height), Some(3));
    }

    #[test]
    fn test_grid_columns() {
        assert_eq!(grid_columns(20), 1);
        assert_eq!(grid_columns(70), 2);
        assert_eq!(grid_columns(200), 3);
    }

    #[test]
    fn test_centered_rect_shrinks() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_rect(20, 4, area), Rect::new(10, 3, 20, 4));
        assert_eq!(centered_rect(80, 20, area), area);
    }
}
