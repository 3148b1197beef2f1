//! UI state transition logic
//!
//! Pure functions for UI state cycling and transitions.

use std::time::{Duration, Instant};

use crate::{SortMode, ViewMode};

/// How long a toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_millis(1500);

/// Toggle between card grid and compact list
///
/// # Examples
/// ```
/// use servicefinder::ViewMode;
/// use servicefinder::logic::ui::cycle_view_mode;
///
/// assert_eq!(cycle_view_mode(ViewMode::Grid), ViewMode::List);
/// assert_eq!(cycle_view_mode(ViewMode::List), ViewMode::Grid);
/// ```
pub fn cycle_view_mode(current: ViewMode) -> ViewMode {
    match current {
        ViewMode::Grid => ViewMode::List,
        ViewMode::List => ViewMode::Grid,
    }
}

/// Cycle through sort keys in menu order
pub fn cycle_sort_mode(current: SortMode) -> SortMode {
    match current {
        SortMode::Newest => SortMode::Oldest,
        SortMode::Oldest => SortMode::RatingHigh,
        SortMode::RatingHigh => SortMode::RatingLow,
        SortMode::RatingLow => SortMode::Name,
        SortMode::Name => SortMode::Newest,
    }
}

pub fn should_dismiss_toast(shown_at: Instant, now: Instant) -> bool {
    now.saturating_duration_since(shown_at) >= TOAST_DURATION
}

/// Step an index through `len` items, wrapping at both ends
pub fn cycle_index(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_sort_mode_returns_to_start() {
        let mut mode = SortMode::Newest;
        for _ in 0..5 {
            mode = cycle_sort_mode(mode);
        }
        assert_eq!(mode, SortMode::Newest);
        assert_eq!(cycle_sort_mode(SortMode::RatingHigh), SortMode::RatingLow);
    }

    #[test]
    fn test_toast_dismissal() {
        let shown = Instant::now();
        assert!(!should_dismiss_toast(shown, shown + Duration::from_millis(1499)));
        assert!(should_dismiss_toast(shown, shown + TOAST_DURATION));
    }

    #[test]
    fn test_cycle_index_wraps() {
        assert_eq!(cycle_index(2, 3, true), 0);
        assert_eq!(cycle_index(0, 3, false), 2);
        assert_eq!(cycle_index(0, 0, true), 0);
    }
}
