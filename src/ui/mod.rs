// UI module - handles all TUI rendering using Ratatui
//
// Architecture:
// - layout: Calculates screen layout (header, sidebar, listings, legend)
// - render: Main orchestration function that coordinates all rendering
// - theme: Category colours and glyphs
// - header: Renders top bar (fetch state, signed-in user)
// - sidebar: Renders the active filter criteria
// - listing_list: Renders the current page as cards or rows
// - legend: Renders hotkey legend
// - search: Renders search input box with term and match count
// - status_bar: Renders bottom status bar (page, counts, busy, last error)
// - dialogs: Renders modal dialogs (auth, add listing, rate, contact, profile, delete)
// - toast: Renders toast notifications (brief pop-up messages)

pub mod dialogs;
pub mod header;
pub mod layout;
pub mod legend;
pub mod listing_list;
pub mod render;
pub mod search;
pub mod sidebar;
pub mod status_bar;
pub mod theme;
pub mod toast;

// Re-export main render function for convenience
pub use render::render;
