//! Business Logic
//!
//! This module contains pure business logic functions that can be unit tested:
//! - debounce: one-shot quiet-interval timer for the search box
//! - errors: error classification for display
//! - formatting: phone, text and rating display helpers
//! - gating: which actions need a signed-in user
//! - pagination: page counts and clamping
//! - rating: review averages and the "Top Rated" badge
//! - search: listing filter criteria
//! - sorting: listing sort keys
//! - ui: UI state transitions and cycling
//! - validators: form and field validation

pub mod debounce;
pub mod errors;
pub mod formatting;
pub mod gating;
pub mod pagination;
pub mod rating;
pub mod search;
pub mod sorting;
pub mod ui;
pub mod validators;
