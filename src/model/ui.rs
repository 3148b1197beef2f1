//! UI Model
//!
//! This sub-model contains all state related to the user interface:
//! preferences, modal dialogs, the search box and the toast.

use std::time::{Duration, Instant};

use super::types::{
    AddListingModal, AuthModal, ConfirmDelete, ProfileModal, RateModal, VimCommandState,
};
use crate::api::Listing;
use crate::logic::debounce::Debouncer;
use crate::logic::errors::ErrorType;
use crate::ViewMode;

/// UI preferences and popups
#[derive(Clone, Debug)]
pub struct UiModel {
    // ============================================
    // PREFERENCES
    // ============================================
    /// Card grid or compact list
    pub view_mode: ViewMode,

    /// Whether vim keybindings are enabled
    pub vim_mode: bool,

    /// Vim command state (for 'gg' double-key)
    pub vim_command_state: VimCommandState,

    // ============================================
    // MODALS (independent of each other)
    // ============================================
    pub auth: Option<AuthModal>,

    pub add_listing: Option<AddListingModal>,

    pub rate: Option<RateModal>,

    /// Contact details for a listing
    pub contact: Option<Listing>,

    pub profile: Option<ProfileModal>,

    pub confirm_delete: Option<ConfirmDelete>,

    /// Toast message (text, timestamp)
    pub toast_message: Option<(String, Instant)>,

    // ============================================
    // SEARCH
    // ============================================
    /// Whether search input is active (receiving keystrokes)
    pub search_mode: bool,

    /// What has been typed; applied to the directory after the debounce
    pub search_input: String,

    pub search_debounce: Debouncer,

    // ============================================
    // STATUS
    // ============================================
    /// Requests sent to the worker and not yet answered
    pub pending_requests: usize,

    /// Kind of the most recent failure, cleared by the next success
    pub last_error: Option<ErrorType>,

    /// Whether app should quit
    pub should_quit: bool,
}

impl UiModel {
    pub fn new(vim_mode: bool, search_delay: Duration) -> Self {
        Self {
            view_mode: ViewMode::default(),
            vim_mode,
            vim_command_state: VimCommandState::None,
            auth: None,
            add_listing: None,
            rate: None,
            contact: None,
            profile: None,
            confirm_delete: None,
            toast_message: None,
            search_mode: false,
            search_input: String::new(),
            search_debounce: Debouncer::new(search_delay),
            pending_requests: 0,
            last_error: None,
            should_quit: false,
        }
    }

    /// Check if any modal dialog is currently showing
    pub fn has_modal(&self) -> bool {
        self.auth.is_some()
            || self.add_listing.is_some()
            || self.rate.is_some()
            || self.contact.is_some()
            || self.profile.is_some()
            || self.confirm_delete.is_some()
    }

    /// Close the top-most modal; returns false when none was open
    pub fn close_top_modal(&mut self) -> bool {
        if self.confirm_delete.take().is_some() {
            return true;
        }
        if self.rate.take().is_some() {
            return true;
        }
        if self.contact.take().is_some() {
            return true;
        }
        if self.add_listing.take().is_some() {
            return true;
        }
        if self.profile.take().is_some() {
            return true;
        }
        self.auth.take().is_some()
    }

    /// Close all modal dialogs
    pub fn close_all_modals(&mut self) {
        self.auth = None;
        self.add_listing = None;
        self.rate = None;
        self.contact = None;
        self.profile = None;
        self.confirm_delete = None;
    }

    pub fn show_toast(&mut self, message: impl Into<String>, now: Instant) {
        self.toast_message = Some((message.into(), now));
    }

    pub fn should_dismiss_toast(&self, now: Instant) -> bool {
        match &self.toast_message {
            Some((_, shown_at)) => crate::logic::ui::should_dismiss_toast(*shown_at, now),
            None => false,
        }
    }

    pub fn dismiss_toast(&mut self) {
        self.toast_message = None;
    }

    pub fn is_busy(&self) -> bool {
        self.pending_requests > 0
    }
}
