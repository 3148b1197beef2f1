//! Shared types for the Model
//!
//! Modal dialog state. Each modal is an `Option` on the UI model; opening one
//! never touches the others.

use super::forms::FormState;
use crate::api::{Category, Listing};
use crate::logic::ui::cycle_index;

/// Vim command state for tracking double-key commands like 'gg'
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VimCommandState {
    None,
    WaitingForSecondG, // First 'g' pressed, waiting for second 'g'
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthTab {
    SignIn,
    SignUp,
    ResetPassword,
}

impl AuthTab {
    pub fn title(&self) -> &'static str {
        match self {
            AuthTab::SignIn => "Sign In",
            AuthTab::SignUp => "Sign Up",
            AuthTab::ResetPassword => "Reset Password",
        }
    }

    pub fn next(&self) -> AuthTab {
        match self {
            AuthTab::SignIn => AuthTab::SignUp,
            AuthTab::SignUp => AuthTab::ResetPassword,
            AuthTab::ResetPassword => AuthTab::SignIn,
        }
    }
}

pub const SIGN_IN_FIELDS: [&str; 2] = ["email", "password"];
pub const SIGN_UP_FIELDS: [&str; 5] = ["displayName", "email", "phone", "password", "confirmPassword"];
pub const RESET_FIELDS: [&str; 1] = ["email"];

/// Sign-in / sign-up / reset modal
#[derive(Clone, Debug, PartialEq)]
pub struct AuthModal {
    pub tab: AuthTab,
    /// Why the modal was opened, when a gated action triggered it
    pub prompt: Option<&'static str>,
    pub sign_in: FormState,
    pub sign_up: FormState,
    pub reset: FormState,
    /// Provider error from the last submit
    pub banner: Option<String>,
}

impl AuthModal {
    pub fn new(tab: AuthTab, prompt: Option<&'static str>) -> Self {
        Self {
            tab,
            prompt,
            sign_in: FormState::new(&SIGN_IN_FIELDS),
            sign_up: FormState::new(&SIGN_UP_FIELDS),
            reset: FormState::new(&RESET_FIELDS),
            banner: None,
        }
    }

    pub fn form(&self) -> &FormState {
        match self.tab {
            AuthTab::SignIn => &self.sign_in,
            AuthTab::SignUp => &self.sign_up,
            AuthTab::ResetPassword => &self.reset,
        }
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        match self.tab {
            AuthTab::SignIn => &mut self.sign_in,
            AuthTab::SignUp => &mut self.sign_up,
            AuthTab::ResetPassword => &mut self.reset,
        }
    }

    /// Switch tab, carrying the email across
    pub fn switch_to(&mut self, tab: AuthTab) {
        let email = self.form().value("email").to_string();
        self.tab = tab;
        self.banner = None;
        let form = self.form_mut();
        if form.value("email").is_empty() && !email.is_empty() {
            form.set("email", email);
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.sign_in.submitting || self.sign_up.submitting || self.reset.submitting
    }
}

pub const LISTING_FIELDS: [&str; 7] = [
    "name",
    "category",
    "description",
    "phone",
    "email",
    "city",
    "image",
];

/// Add-listing modal. `image` holds a local file path.
#[derive(Clone, Debug, PartialEq)]
pub struct AddListingModal {
    pub form: FormState,
    pub banner: Option<String>,
}

impl AddListingModal {
    pub fn new(owner_email: Option<&str>) -> Self {
        let mut form = FormState::new(&LISTING_FIELDS);
        if let Some(email) = owner_email {
            form.set("email", email);
        }
        Self { form, banner: None }
    }

    /// Step the category selector through the fixed list
    pub fn cycle_category(&mut self, forward: bool) {
        let all = Category::ALL;
        let next = match Category::parse(self.form.value("category")) {
            Some(current) => {
                let idx = all.iter().position(|c| *c == current).unwrap_or(0);
                all[cycle_index(idx, all.len(), forward)]
            }
            None if forward => all[0],
            None => all[all.len() - 1],
        };
        self.form.set("category", next.as_str());
    }
}

/// Star picker; starts at 5 like the web client
#[derive(Clone, Debug, PartialEq)]
pub struct RateModal {
    pub listing_id: String,
    pub listing_name: String,
    pub stars: u8,
    pub submitting: bool,
}

impl RateModal {
    pub fn new(listing: &Listing) -> Self {
        Self {
            listing_id: listing.id.clone(),
            listing_name: listing.name.clone(),
            stars: 5,
            submitting: false,
        }
    }

    pub fn adjust(&mut self, delta: i8) {
        self.stars = (self.stars as i8 + delta).clamp(1, 5) as u8;
    }
}

pub const PROFILE_FIELDS: [&str; 3] = ["displayName", "phone", "photoURL"];

#[derive(Clone, Debug, PartialEq)]
pub struct ProfileModal {
    pub form: FormState,
    pub banner: Option<String>,
}

/// Confirmation before deleting one's own listing
#[derive(Clone, Debug, PartialEq)]
pub struct ConfirmDelete {
    pub listing_id: String,
    pub listing_name: String,
    pub image: Option<String>,
}
