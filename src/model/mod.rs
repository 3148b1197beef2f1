//! Pure Application Model - Elm Architecture
//!
//! This module defines the pure, cloneable state for the application.
//! The Model is organized into focused sub-models:
//!
//! - **DirectoryModel**: fetched listings, filter criteria, visible page
//! - **SessionModel**: signed-in user and their profile
//! - **UiModel**: preferences, modal dialogs, search box, toast
//!
//! Key principles:
//! - Clone + Debug: Can snapshot state
//! - No services: All I/O lives in the worker
//! - Pure accessors: Helper methods are side-effect free

pub mod directory;
pub mod forms;
pub mod session;
pub mod types;
pub mod ui;

use std::time::{Duration, Instant};

pub use directory::DirectoryModel;
pub use forms::FormState;
pub use session::SessionModel;
pub use types::*;
pub use ui::UiModel;

use crate::config::Config;

/// Root application model composed of focused sub-models
#[derive(Clone, Debug)]
pub struct Model {
    pub directory: DirectoryModel,
    pub session: SessionModel,
    pub ui: UiModel,
}

impl Model {
    pub fn new(page_size: usize, search_delay: Duration, vim_mode: bool) -> Self {
        Self {
            directory: DirectoryModel::new(page_size),
            session: SessionModel::new(),
            ui: UiModel::new(vim_mode, search_delay),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.page_size,
            Duration::from_millis(config.search_debounce_ms),
            config.vim_mode,
        )
    }

    /// Check if any modal dialog is showing
    pub fn has_modal(&self) -> bool {
        self.ui.has_modal()
    }

    pub fn selected_listing(&self) -> Option<&crate::api::Listing> {
        self.directory.selected_listing()
    }

    pub fn show_toast(&mut self, message: impl Into<String>, now: Instant) {
        self.ui.show_toast(message, now);
    }

    /// Show an error toast (rendered with the failure marker)
    pub fn show_error(&mut self, message: &str, now: Instant) {
        self.ui.show_toast(format!("Error: {}", message), now);
    }

    /// Time until the next deadline the loop must wake for
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        self.ui.search_debounce.remaining(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        let model = Model::from_config(&Config::demo());
        assert!(model.directory.loading);
        assert!(!model.session.is_signed_in());
        assert!(!model.has_modal());
        assert!(model.selected_listing().is_none());
    }

    #[test]
    fn test_model_is_cloneable() {
        let model = Model::new(9, Duration::from_millis(300), false);
        let _cloned = model.clone();
    }

    #[test]
    fn test_error_toast_prefix() {
        let mut model = Model::new(9, Duration::from_millis(300), false);
        model.show_error("Failed to fetch services", Instant::now());
        let (text, _) = model.ui.toast_message.as_ref().unwrap();
        assert_eq!(text, "Error: Failed to fetch services");
    }

    #[test]
    fn test_next_wakeup_follows_debounce() {
        let mut model = Model::new(9, Duration::from_millis(300), false);
        let now = Instant::now();
        assert_eq!(model.next_wakeup(now), None);
        model.ui.search_debounce.touch(now);
        assert_eq!(model.next_wakeup(now), Some(Duration::from_millis(300)));
    }
}
