//! Update - Elm Architecture
//!
//! `update` applies one user intent to the model and returns the backend
//! requests it needs; `apply_response` does the same for a worker reply.
//! Neither performs I/O, so both are driven directly in tests.

use std::path::PathBuf;
use std::time::Instant;

use crate::api::{AuthUser, Category, NewListing, ProfileUpdate, SignUpDetails};
use crate::logic::formatting::{is_valid_url, sanitize_input};
use crate::logic::gating::{authorize, Gate, GatedAction};
use crate::logic::ui::{cycle_sort_mode, cycle_view_mode};
use crate::logic::validators::{
    validate_email, validate_phone, validate_service_form, validate_sign_in_form,
    validate_sign_up_form, FieldErrors, ServiceForm, SignUpForm,
};
use crate::model::{
    AddListingModal, AuthModal, AuthTab, ConfirmDelete, FormState, Model, ProfileModal,
    RateModal, PROFILE_FIELDS,
};
use crate::services::api::{ApiError, ApiRequest, ApiResponse};

/// Something the user (or the clock, or the identity provider) did
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Quit,
    /// Clock tick: debounce deadline and toast expiry
    Tick,
    AuthChanged(Option<AuthUser>),

    // Search box
    StartSearch,
    SearchChar(char),
    SearchBackspace,
    /// Apply the typed term now and leave the search box
    ApplySearch,
    /// Clear the term and leave the search box
    CancelSearch,

    // Directory
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    CycleCategory { forward: bool },
    CycleCity { forward: bool },
    CycleMinRating,
    CycleSort,
    ClearFilters,
    ToggleView,
    Refresh,

    // Account
    Gated(GatedAction),
    OpenSignIn,
    SignOut,

    // Whichever modal is on top
    CloseModal,
    FormChar(char),
    FormBackspace,
    FocusNext,
    FocusPrev,
    SwitchAuthTab,
    /// Left/right on a selector (category, stars)
    AdjustSelector { forward: bool },
    SetStars(u8),
    Submit,

    DismissToast,
}

/// The modal that receives keys, in stacking order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopModal {
    ConfirmDelete,
    Rate,
    Contact,
    AddListing,
    Profile,
    Auth,
}

pub fn top_modal(model: &Model) -> Option<TopModal> {
    let ui = &model.ui;
    if ui.confirm_delete.is_some() {
        Some(TopModal::ConfirmDelete)
    } else if ui.rate.is_some() {
        Some(TopModal::Rate)
    } else if ui.contact.is_some() {
        Some(TopModal::Contact)
    } else if ui.add_listing.is_some() {
        Some(TopModal::AddListing)
    } else if ui.profile.is_some() {
        Some(TopModal::Profile)
    } else if ui.auth.is_some() {
        Some(TopModal::Auth)
    } else {
        None
    }
}

/// Apply an intent; returns the requests to send to the worker
pub fn update(model: &mut Model, intent: Intent, now: Instant) -> Vec<ApiRequest> {
    let requests = dispatch(model, intent, now);
    model.ui.pending_requests += requests.len();
    requests
}

fn dispatch(model: &mut Model, intent: Intent, now: Instant) -> Vec<ApiRequest> {
    match intent {
        Intent::Quit => {
            model.ui.should_quit = true;
            vec![]
        }

        Intent::Tick => {
            if model.ui.should_dismiss_toast(now) {
                model.ui.dismiss_toast();
            }
            if model.ui.search_debounce.poll(now) {
                let term = model.ui.search_input.clone();
                model.directory.set_search(&term);
            }
            vec![]
        }

        Intent::AuthChanged(user) => {
            let signed_out = user.is_none() && model.session.is_signed_in();
            let needs_profile = model.session.apply_auth_change(user);
            if signed_out {
                close_gated_modals(model);
            }
            match (needs_profile, model.session.uid()) {
                (true, Some(uid)) => vec![ApiRequest::FetchProfile { uid: uid.to_string() }],
                _ => vec![],
            }
        }

        Intent::StartSearch => {
            model.ui.search_mode = true;
            vec![]
        }

        Intent::SearchChar(c) => {
            model.ui.search_input.push(c);
            model.ui.search_debounce.touch(now);
            vec![]
        }

        Intent::SearchBackspace => {
            if model.ui.search_input.pop().is_some() {
                model.ui.search_debounce.touch(now);
            }
            vec![]
        }

        Intent::ApplySearch => {
            model.ui.search_debounce.cancel();
            model.ui.search_mode = false;
            let term = model.ui.search_input.clone();
            model.directory.set_search(&term);
            vec![]
        }

        Intent::CancelSearch => {
            model.ui.search_debounce.cancel();
            model.ui.search_mode = false;
            model.ui.search_input.clear();
            model.directory.set_search("");
            vec![]
        }

        Intent::SelectNext => {
            model.directory.select_next();
            vec![]
        }
        Intent::SelectPrev => {
            model.directory.select_prev();
            vec![]
        }
        Intent::SelectFirst => {
            model.directory.select_first();
            vec![]
        }
        Intent::SelectLast => {
            model.directory.select_last();
            vec![]
        }
        Intent::NextPage => {
            model.directory.next_page();
            vec![]
        }
        Intent::PrevPage => {
            model.directory.prev_page();
            vec![]
        }
        Intent::FirstPage => {
            model.directory.go_to_page(1);
            vec![]
        }
        Intent::LastPage => {
            let last = model.directory.pagination.total_pages();
            model.directory.go_to_page(last);
            vec![]
        }

        Intent::CycleCategory { forward } => {
            model.directory.cycle_category(forward);
            vec![]
        }
        Intent::CycleCity { forward } => {
            model.directory.cycle_city(forward);
            vec![]
        }
        Intent::CycleMinRating => {
            model.directory.cycle_min_rating();
            vec![]
        }
        Intent::CycleSort => {
            let next = cycle_sort_mode(model.directory.sort);
            model.directory.set_sort(next);
            vec![]
        }
        Intent::ClearFilters => {
            model.ui.search_input.clear();
            model.ui.search_debounce.cancel();
            model.directory.clear_filters();
            vec![]
        }
        Intent::ToggleView => {
            model.ui.view_mode = cycle_view_mode(model.ui.view_mode);
            vec![]
        }
        Intent::Refresh => {
            model.directory.loading = true;
            vec![ApiRequest::FetchListings]
        }

        Intent::Gated(action) => gated(model, action, now),

        Intent::OpenSignIn => {
            if model.session.is_signed_in() {
                let name = model.session.display_name();
                model.show_toast(format!("Signed in as {}", name), now);
            } else if model.ui.auth.is_none() {
                model.ui.auth = Some(AuthModal::new(AuthTab::SignIn, None));
            }
            vec![]
        }

        Intent::SignOut => {
            if model.session.is_signed_in() {
                vec![ApiRequest::SignOut]
            } else {
                vec![]
            }
        }

        Intent::CloseModal => {
            model.ui.close_top_modal();
            vec![]
        }

        Intent::FormChar(c) => {
            if let Some(form) = top_form(model) {
                form.insert_char(c);
            }
            clear_banner(model);
            vec![]
        }

        Intent::FormBackspace => {
            if let Some(form) = top_form(model) {
                form.backspace();
            }
            vec![]
        }

        Intent::FocusNext => {
            if let Some(form) = top_form_any(model) {
                form.focus_next();
            }
            vec![]
        }

        Intent::FocusPrev => {
            if let Some(form) = top_form_any(model) {
                form.focus_prev();
            }
            vec![]
        }

        Intent::SwitchAuthTab => {
            if top_modal(model) == Some(TopModal::Auth) {
                if let Some(auth) = model.ui.auth.as_mut() {
                    let next = auth.tab.next();
                    auth.switch_to(next);
                }
            }
            vec![]
        }

        Intent::AdjustSelector { forward } => {
            match top_modal(model) {
                Some(TopModal::Rate) => {
                    if let Some(rate) = model.ui.rate.as_mut() {
                        rate.adjust(if forward { 1 } else { -1 });
                    }
                }
                Some(TopModal::AddListing) => {
                    if let Some(add) = model.ui.add_listing.as_mut() {
                        if add.form.focused() == "category" {
                            add.cycle_category(forward);
                        }
                    }
                }
                _ => {}
            }
            vec![]
        }

        Intent::SetStars(stars) => {
            if let Some(rate) = model.ui.rate.as_mut() {
                rate.stars = stars.clamp(1, 5);
            }
            vec![]
        }

        Intent::Submit => submit(model, now),

        Intent::DismissToast => {
            model.ui.dismiss_toast();
            vec![]
        }
    }
}

/// Text-entry form of the top modal. The category selector takes no typing.
fn top_form(model: &mut Model) -> Option<&mut FormState> {
    let form = top_form_any(model)?;
    if form.focused() == "category" {
        return None;
    }
    Some(form)
}

fn top_form_any(model: &mut Model) -> Option<&mut FormState> {
    match top_modal(model)? {
        TopModal::Auth => model.ui.auth.as_mut().map(|a| a.form_mut()),
        TopModal::AddListing => model.ui.add_listing.as_mut().map(|a| &mut a.form),
        TopModal::Profile => model.ui.profile.as_mut().map(|p| &mut p.form),
        _ => None,
    }
}

fn clear_banner(model: &mut Model) {
    match top_modal(model) {
        Some(TopModal::Auth) => {
            if let Some(auth) = model.ui.auth.as_mut() {
                auth.banner = None;
            }
        }
        Some(TopModal::AddListing) => {
            if let Some(add) = model.ui.add_listing.as_mut() {
                add.banner = None;
            }
        }
        Some(TopModal::Profile) => {
            if let Some(profile) = model.ui.profile.as_mut() {
                profile.banner = None;
            }
        }
        _ => {}
    }
}

fn close_gated_modals(model: &mut Model) {
    model.ui.add_listing = None;
    model.ui.rate = None;
    model.ui.contact = None;
    model.ui.profile = None;
    model.ui.confirm_delete = None;
}

fn gated(model: &mut Model, action: GatedAction, now: Instant) -> Vec<ApiRequest> {
    let needs_listing = matches!(
        action,
        GatedAction::Contact | GatedAction::Rate | GatedAction::DeleteListing
    );
    let listing = model.selected_listing().cloned();
    if needs_listing && listing.is_none() {
        return vec![];
    }

    match authorize(action, model.session.user.as_ref(), listing.as_ref()) {
        Gate::NeedsSignIn => {
            if model.ui.auth.is_none() {
                model.ui.auth = Some(AuthModal::new(AuthTab::SignIn, Some(action.prompt())));
            }
        }
        Gate::Forbidden => {
            model.show_error("You can only delete your own services", now);
        }
        Gate::Allowed => match (action, listing) {
            (GatedAction::Contact, Some(listing)) => model.ui.contact = Some(listing),
            (GatedAction::Rate, Some(listing)) => model.ui.rate = Some(RateModal::new(&listing)),
            (GatedAction::DeleteListing, Some(listing)) => {
                model.ui.confirm_delete = Some(ConfirmDelete {
                    listing_id: listing.id.clone(),
                    listing_name: listing.name.clone(),
                    image: listing.image.clone(),
                })
            }
            (GatedAction::AddListing, _) => {
                let email = model.session.email().map(str::to_string);
                model.ui.add_listing = Some(AddListingModal::new(email.as_deref()));
            }
            (GatedAction::EditProfile, _) => {
                let modal = profile_modal(model);
                model.ui.profile = Some(modal);
            }
            _ => {}
        },
    }
    vec![]
}

fn profile_modal(model: &Model) -> ProfileModal {
    let mut form = FormState::new(&PROFILE_FIELDS);
    let session = &model.session;
    match &session.profile {
        Some(profile) => {
            form.set("displayName", profile.display_name.clone());
            form.set("phone", profile.phone.clone());
            form.set("photoURL", profile.photo_url.clone());
        }
        None => form.set("displayName", session.display_name()),
    }
    ProfileModal { form, banner: None }
}

fn submit(model: &mut Model, now: Instant) -> Vec<ApiRequest> {
    match top_modal(model) {
        Some(TopModal::Auth) => submit_auth(model),
        Some(TopModal::AddListing) => submit_listing(model),
        Some(TopModal::Profile) => submit_profile(model, now),
        Some(TopModal::Rate) => {
            let Some(rate) = model.ui.rate.as_mut() else {
                return vec![];
            };
            if rate.submitting {
                return vec![];
            }
            rate.submitting = true;
            vec![ApiRequest::RateListing {
                listing_id: rate.listing_id.clone(),
                rating: f64::from(rate.stars),
            }]
        }
        Some(TopModal::ConfirmDelete) => match model.ui.confirm_delete.take() {
            Some(confirm) => vec![ApiRequest::DeleteListing {
                listing_id: confirm.listing_id,
                image: confirm.image,
            }],
            None => vec![],
        },
        Some(TopModal::Contact) => {
            model.ui.contact = None;
            vec![]
        }
        None => vec![],
    }
}

fn submit_auth(model: &mut Model) -> Vec<ApiRequest> {
    let Some(auth) = model.ui.auth.as_mut() else {
        return vec![];
    };
    if auth.is_submitting() {
        return vec![];
    }
    auth.banner = None;

    match auth.tab {
        AuthTab::SignIn => {
            let form = &mut auth.sign_in;
            let email = form.value("email").trim().to_string();
            let password = form.value("password").to_string();
            let validation = validate_sign_in_form(&email, &password);
            if !validation.is_valid() {
                form.set_errors(validation.errors);
                return vec![];
            }
            form.submitting = true;
            vec![ApiRequest::SignIn { email, password }]
        }

        AuthTab::SignUp => {
            let form = &mut auth.sign_up;
            let values = SignUpForm {
                display_name: form.value("displayName").trim().to_string(),
                email: form.value("email").trim().to_string(),
                phone: form.value("phone").trim().to_string(),
                password: form.value("password").to_string(),
                confirm_password: form.value("confirmPassword").to_string(),
            };
            let validation = validate_sign_up_form(&values);
            if !validation.is_valid() {
                form.set_errors(validation.errors);
                return vec![];
            }
            form.submitting = true;
            vec![ApiRequest::SignUp {
                email: values.email,
                password: values.password,
                details: SignUpDetails {
                    display_name: sanitize_input(&values.display_name),
                    phone: values.phone,
                    photo_url: String::new(),
                },
            }]
        }

        AuthTab::ResetPassword => {
            let form = &mut auth.reset;
            let email = form.value("email").trim().to_string();
            let mut errors = FieldErrors::new();
            if email.is_empty() {
                errors.insert("email", "Email is required");
            } else if !validate_email(&email) {
                errors.insert("email", "Please enter a valid email address");
            }
            if !errors.is_empty() {
                form.set_errors(errors);
                return vec![];
            }
            form.submitting = true;
            vec![ApiRequest::SendPasswordReset { email }]
        }
    }
}

fn submit_listing(model: &mut Model) -> Vec<ApiRequest> {
    let Some(user_id) = model.session.uid().map(str::to_string) else {
        model.ui.add_listing = None;
        model.ui.auth = Some(AuthModal::new(
            AuthTab::SignIn,
            Some(GatedAction::AddListing.prompt()),
        ));
        return vec![];
    };
    let Some(add) = model.ui.add_listing.as_mut() else {
        return vec![];
    };
    if add.form.submitting {
        return vec![];
    }

    let form = &mut add.form;
    let values = ServiceForm {
        name: sanitize_input(form.value("name")),
        category: form.value("category").to_string(),
        description: sanitize_input(form.value("description")),
        phone: form.value("phone").trim().to_string(),
        email: form.value("email").trim().to_string(),
        city: sanitize_input(form.value("city")),
    };
    let validation = validate_service_form(&values);
    if !validation.is_valid() {
        form.set_errors(validation.errors);
        return vec![];
    }
    let Some(category) = Category::parse(&values.category) else {
        form.set_errors(FieldErrors::from([("category", "Please select a valid category")]));
        return vec![];
    };

    let image = form.value("image").trim();
    let image_path = (!image.is_empty()).then(|| PathBuf::from(image));

    form.submitting = true;
    add.banner = None;
    vec![ApiRequest::AddListing {
        draft: NewListing {
            name: values.name,
            category,
            description: values.description,
            phone: values.phone,
            email: values.email,
            city: values.city,
            image: None,
            rating: None,
        },
        image_path,
        user_id,
    }]
}

fn submit_profile(model: &mut Model, now: Instant) -> Vec<ApiRequest> {
    let Some(uid) = model.session.uid().map(str::to_string) else {
        model.ui.profile = None;
        model.show_error("Please sign in again", now);
        return vec![];
    };
    let Some(profile) = model.ui.profile.as_mut() else {
        return vec![];
    };
    if profile.form.submitting {
        return vec![];
    }

    let form = &mut profile.form;
    let display_name = sanitize_input(form.value("displayName"));
    let phone = form.value("phone").trim().to_string();
    let photo_url = form.value("photoURL").trim().to_string();

    let mut errors = FieldErrors::new();
    match display_name.chars().count() {
        0 => {
            errors.insert("displayName", "Name is required");
        }
        1 => {
            errors.insert("displayName", "Name must be at least 2 characters");
        }
        _ => {}
    }
    if !phone.is_empty() && !validate_phone(&phone) {
        errors.insert("phone", "Please enter a valid phone number");
    }
    if !photo_url.is_empty() && !is_valid_url(&photo_url) {
        errors.insert("photoURL", "Please enter a valid URL");
    }
    if !errors.is_empty() {
        form.set_errors(errors);
        return vec![];
    }

    form.submitting = true;
    vec![ApiRequest::UpdateProfile {
        uid,
        update: ProfileUpdate {
            display_name: Some(display_name),
            email: None,
            phone: Some(phone),
            photo_url: Some(photo_url),
        },
    }]
}

/// Apply a worker reply; returns follow-up requests (refetches)
pub fn apply_response(model: &mut Model, response: ApiResponse, now: Instant) -> Vec<ApiRequest> {
    model.ui.pending_requests = model.ui.pending_requests.saturating_sub(1);
    let requests = handle_response(model, response, now);
    model.ui.pending_requests += requests.len();
    requests
}

fn record_error(model: &mut Model, error: &ApiError) {
    model.ui.last_error = Some(error.kind);
}

fn refetch(model: &mut Model) -> Vec<ApiRequest> {
    model.directory.loading = true;
    vec![ApiRequest::FetchListings]
}

fn handle_response(model: &mut Model, response: ApiResponse, now: Instant) -> Vec<ApiRequest> {
    match response {
        ApiResponse::Listings(Ok(listings)) => {
            model.ui.last_error = None;
            model.directory.set_listings(listings);
            vec![]
        }
        ApiResponse::Listings(Err(e)) => {
            record_error(model, &e);
            model.directory.set_error(e.message.clone());
            model.show_error(&e.message, now);
            vec![]
        }

        ApiResponse::SignedIn(result) | ApiResponse::SignedUp(result) => match result {
            Ok(user) => {
                model.ui.auth = None;
                let needs_profile = model.session.apply_auth_change(Some(user));
                let name = model.session.display_name();
                model.show_toast(format!("Welcome, {}!", name), now);
                match (needs_profile, model.session.uid()) {
                    (true, Some(uid)) => vec![ApiRequest::FetchProfile { uid: uid.to_string() }],
                    _ => vec![],
                }
            }
            Err(e) => {
                record_error(model, &e);
                match model.ui.auth.as_mut() {
                    Some(auth) => {
                        auth.sign_in.submitting = false;
                        auth.sign_up.submitting = false;
                        auth.banner = Some(e.message);
                    }
                    None => model.show_error(&e.message, now),
                }
                vec![]
            }
        },

        ApiResponse::SignedOut(Ok(())) => {
            model.session.clear();
            close_gated_modals(model);
            model.show_toast("Signed out", now);
            vec![]
        }
        ApiResponse::SignedOut(Err(e)) => {
            record_error(model, &e);
            model.show_error(&e.message, now);
            vec![]
        }

        ApiResponse::PasswordResetSent(Ok(())) => {
            model.ui.auth = None;
            model.show_toast("Password reset email sent! Check your inbox.", now);
            vec![]
        }
        ApiResponse::PasswordResetSent(Err(e)) => {
            record_error(model, &e);
            match model.ui.auth.as_mut() {
                Some(auth) => {
                    auth.reset.submitting = false;
                    auth.banner = Some(e.message);
                }
                None => model.show_error(&e.message, now),
            }
            vec![]
        }

        ApiResponse::ListingAdded(Ok(_id)) => {
            model.ui.add_listing = None;
            model.show_toast("Service added successfully!", now);
            refetch(model)
        }
        ApiResponse::ListingAdded(Err(e)) => {
            record_error(model, &e);
            match model.ui.add_listing.as_mut() {
                Some(add) => {
                    add.form.submitting = false;
                    add.banner = Some(format!("Error adding service: {}", e.message));
                }
                None => model.show_error(&e.message, now),
            }
            vec![]
        }

        ApiResponse::ListingRated(Ok(())) => {
            model.ui.rate = None;
            model.show_toast("Thank you for your rating!", now);
            refetch(model)
        }
        ApiResponse::ListingRated(Err(e)) => {
            record_error(model, &e);
            if let Some(rate) = model.ui.rate.as_mut() {
                rate.submitting = false;
            }
            model.show_error(&e.message, now);
            vec![]
        }

        ApiResponse::ListingDeleted(Ok(())) => {
            model.show_toast("Service deleted", now);
            refetch(model)
        }
        ApiResponse::ListingDeleted(Err(e)) => {
            record_error(model, &e);
            model.show_error(&e.message, now);
            vec![]
        }

        ApiResponse::Profile(Ok(profile)) => {
            model.session.set_profile(profile);
            vec![]
        }
        ApiResponse::Profile(Err(e)) => {
            // Background fetch; the name falls back to the account's
            record_error(model, &e);
            vec![]
        }

        ApiResponse::ProfileUpdated(Ok(())) => {
            model.ui.profile = None;
            model.show_toast("Profile updated", now);
            match model.session.uid() {
                Some(uid) => vec![ApiRequest::FetchProfile { uid: uid.to_string() }],
                None => vec![],
            }
        }
        ApiResponse::ProfileUpdated(Err(e)) => {
            record_error(model, &e);
            match model.ui.profile.as_mut() {
                Some(profile) => {
                    profile.form.submitting = false;
                    profile.banner = Some(e.message);
                }
                None => model.show_error(&e.message, now),
            }
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Listing;
    use crate::logic::errors::ErrorType;
    use std::time::Duration;

    fn model() -> Model {
        Model::new(9, Duration::from_millis(300), false)
    }

    fn listing(id: &str, owner: &str) -> Listing {
        let mut l: Listing = serde_json::from_value(serde_json::json!({
            "name": "Joe's Plumbing",
            "category": "plumbing",
            "city": "Durban",
            "phone": "0821234567",
            "userId": owner,
        }))
        .unwrap();
        l.id = id.into();
        l
    }

    fn user(uid: &str) -> AuthUser {
        AuthUser {
            uid: uid.into(),
            email: Some("thandi@example.com".into()),
            display_name: Some("Thandi".into()),
            photo_url: None,
        }
    }

    fn signed_in(uid: &str) -> Model {
        let mut m = model();
        m.directory.set_listings(vec![listing("s1", uid), listing("s2", "other")]);
        update(&mut m, Intent::AuthChanged(Some(user(uid))), Instant::now());
        m.ui.pending_requests = 0;
        m
    }

    fn type_str(m: &mut Model, s: &str) {
        for c in s.chars() {
            update(m, Intent::FormChar(c), Instant::now());
        }
    }

    #[test]
    fn test_gated_action_signed_out_opens_auth_without_request() {
        let mut m = model();
        m.directory.set_listings(vec![listing("s1", "u1")]);
        let requests = update(&mut m, Intent::Gated(GatedAction::Rate), Instant::now());

        assert!(requests.is_empty());
        assert_eq!(m.ui.pending_requests, 0);
        let auth = m.ui.auth.as_ref().unwrap();
        assert_eq!(auth.tab, AuthTab::SignIn);
        assert_eq!(auth.prompt, Some("Sign in to rate this service"));
        assert!(m.ui.rate.is_none());
    }

    #[test]
    fn test_gated_action_signed_in_opens_modal() {
        let mut m = signed_in("u1");
        update(&mut m, Intent::Gated(GatedAction::Contact), Instant::now());
        assert_eq!(m.ui.contact.as_ref().map(|l| l.id.as_str()), Some("s1"));
        assert!(m.ui.auth.is_none());
    }

    #[test]
    fn test_delete_other_users_listing_is_refused() {
        let mut m = signed_in("u1");
        update(&mut m, Intent::SelectNext, Instant::now());
        let requests = update(&mut m, Intent::Gated(GatedAction::DeleteListing), Instant::now());
        assert!(requests.is_empty());
        assert!(m.ui.confirm_delete.is_none());
        assert!(m.ui.toast_message.as_ref().unwrap().0.starts_with("Error:"));
    }

    #[test]
    fn test_delete_own_listing_after_confirm() {
        let mut m = signed_in("u1");
        let now = Instant::now();
        update(&mut m, Intent::Gated(GatedAction::DeleteListing), now);
        assert!(m.ui.confirm_delete.is_some());

        let requests = update(&mut m, Intent::Submit, now);
        assert_eq!(
            requests,
            vec![ApiRequest::DeleteListing {
                listing_id: "s1".into(),
                image: None
            }]
        );
        assert!(m.ui.confirm_delete.is_none());

        let follow_up = apply_response(&mut m, ApiResponse::ListingDeleted(Ok(())), now);
        assert_eq!(follow_up, vec![ApiRequest::FetchListings]);
        assert_eq!(m.ui.pending_requests, 1);
    }

    #[test]
    fn test_search_applies_once_after_quiet_interval() {
        let mut m = model();
        m.directory.set_listings(vec![listing("s1", "u1")]);
        let start = Instant::now();
        let gen = m.directory.generation;

        update(&mut m, Intent::StartSearch, start);
        for (i, c) in "plumb".chars().enumerate() {
            let t = start + Duration::from_millis(50 * i as u64);
            update(&mut m, Intent::SearchChar(c), t);
            update(&mut m, Intent::Tick, t);
        }
        assert_eq!(m.directory.filters.search, "");
        assert_eq!(m.directory.generation, gen);

        let last = start + Duration::from_millis(200);
        update(&mut m, Intent::Tick, last + Duration::from_millis(300));
        update(&mut m, Intent::Tick, last + Duration::from_millis(600));
        assert_eq!(m.directory.filters.search, "plumb");
        assert_eq!(m.directory.generation, gen + 1);
        assert_eq!(m.directory.visible.len(), 1);
    }

    #[test]
    fn test_cancel_search_clears_term() {
        let mut m = model();
        let now = Instant::now();
        update(&mut m, Intent::StartSearch, now);
        update(&mut m, Intent::SearchChar('x'), now);
        update(&mut m, Intent::ApplySearch, now);
        assert_eq!(m.directory.filters.search, "x");

        update(&mut m, Intent::CancelSearch, now);
        assert_eq!(m.directory.filters.search, "");
        assert!(m.ui.search_input.is_empty());
        assert!(!m.ui.search_debounce.is_pending());
    }

    #[test]
    fn test_sign_in_validation_blocks_request() {
        let mut m = model();
        let now = Instant::now();
        update(&mut m, Intent::OpenSignIn, now);
        type_str(&mut m, "not-an-email");

        let requests = update(&mut m, Intent::Submit, now);
        assert!(requests.is_empty());
        let form = &m.ui.auth.as_ref().unwrap().sign_in;
        assert_eq!(form.error("email"), Some("Please enter a valid email address"));
        assert_eq!(form.error("password"), Some("Password is required"));
    }

    #[test]
    fn test_sign_in_submit_and_failure_banner() {
        let mut m = model();
        let now = Instant::now();
        update(&mut m, Intent::OpenSignIn, now);
        type_str(&mut m, "a@b.co");
        update(&mut m, Intent::FocusNext, now);
        type_str(&mut m, "secret1");

        let requests = update(&mut m, Intent::Submit, now);
        assert_eq!(
            requests,
            vec![ApiRequest::SignIn {
                email: "a@b.co".into(),
                password: "secret1".into()
            }]
        );
        assert!(update(&mut m, Intent::Submit, now).is_empty());

        apply_response(
            &mut m,
            ApiResponse::SignedIn(Err(ApiError {
                message: "Incorrect password".into(),
                kind: ErrorType::Credentials,
            })),
            now,
        );
        let auth = m.ui.auth.as_ref().unwrap();
        assert_eq!(auth.banner.as_deref(), Some("Incorrect password"));
        assert!(!auth.sign_in.submitting);
        assert_eq!(m.ui.last_error, Some(ErrorType::Credentials));
        assert_eq!(m.ui.pending_requests, 0);
    }

    #[test]
    fn test_signed_in_response_closes_modal_and_fetches_profile() {
        let mut m = model();
        let now = Instant::now();
        update(&mut m, Intent::OpenSignIn, now);
        let follow_up = apply_response(&mut m, ApiResponse::SignedIn(Ok(user("u9"))), now);
        assert!(m.ui.auth.is_none());
        assert_eq!(follow_up, vec![ApiRequest::FetchProfile { uid: "u9".into() }]);

        // The provider's own notification for the same user adds nothing
        let again = update(&mut m, Intent::AuthChanged(Some(user("u9"))), now);
        assert!(again.is_empty());
    }

    #[test]
    fn test_add_listing_flow() {
        let mut m = signed_in("u1");
        let now = Instant::now();
        update(&mut m, Intent::Gated(GatedAction::AddListing), now);
        assert_eq!(m.ui.add_listing.as_ref().unwrap().form.value("email"), "thandi@example.com");

        type_str(&mut m, "Joe's Plumbing");
        update(&mut m, Intent::FocusNext, now);
        type_str(&mut m, "zzz");
        update(&mut m, Intent::AdjustSelector { forward: true }, now);
        update(&mut m, Intent::FocusNext, now);
        type_str(&mut m, "Burst pipes and geysers repaired");
        update(&mut m, Intent::FocusNext, now);
        update(&mut m, Intent::FocusNext, now);
        update(&mut m, Intent::FocusNext, now);
        type_str(&mut m, "Durban");

        let requests = update(&mut m, Intent::Submit, now);
        assert_eq!(requests.len(), 1);
        match &requests[0] {
            ApiRequest::AddListing {
                draft,
                image_path,
                user_id,
            } => {
                assert_eq!(draft.category, Category::Plumbing);
                assert_eq!(draft.city, "Durban");
                assert_eq!(*image_path, None);
                assert_eq!(user_id, "u1");
            }
            other => panic!("unexpected request {:?}", other),
        }

        let follow_up = apply_response(&mut m, ApiResponse::ListingAdded(Ok("new".into())), now);
        assert!(m.ui.add_listing.is_none());
        assert_eq!(follow_up, vec![ApiRequest::FetchListings]);
        assert_eq!(
            m.ui.toast_message.as_ref().map(|(t, _)| t.as_str()),
            Some("Service added successfully!")
        );
    }

    #[test]
    fn test_add_listing_validation_errors() {
        let mut m = signed_in("u1");
        let now = Instant::now();
        update(&mut m, Intent::Gated(GatedAction::AddListing), now);
        let requests = update(&mut m, Intent::Submit, now);
        assert!(requests.is_empty());

        let form = &m.ui.add_listing.as_ref().unwrap().form;
        assert_eq!(form.error("category"), Some("Please select a valid category"));
        assert!(form.error("name").is_some());
        assert_eq!(form.focused(), "name");
    }

    #[test]
    fn test_rate_flow() {
        let mut m = signed_in("u1");
        let now = Instant::now();
        update(&mut m, Intent::Gated(GatedAction::Rate), now);
        update(&mut m, Intent::SetStars(3), now);
        update(&mut m, Intent::AdjustSelector { forward: true }, now);

        let requests = update(&mut m, Intent::Submit, now);
        assert_eq!(
            requests,
            vec![ApiRequest::RateListing {
                listing_id: "s1".into(),
                rating: 4.0
            }]
        );

        apply_response(
            &mut m,
            ApiResponse::ListingRated(Err(ApiError {
                message: "Failed to update rating".into(),
                kind: ErrorType::ServerError,
            })),
            now,
        );
        assert!(!m.ui.rate.as_ref().unwrap().submitting);
        assert_eq!(
            m.ui.toast_message.as_ref().map(|(t, _)| t.as_str()),
            Some("Error: Failed to update rating")
        );
    }

    #[test]
    fn test_sign_out_closes_gated_modals() {
        let mut m = signed_in("u1");
        let now = Instant::now();
        update(&mut m, Intent::Gated(GatedAction::Contact), now);
        let requests = update(&mut m, Intent::SignOut, now);
        assert_eq!(requests, vec![ApiRequest::SignOut]);

        apply_response(&mut m, ApiResponse::SignedOut(Ok(())), now);
        assert!(!m.session.is_signed_in());
        assert!(m.ui.contact.is_none());
    }

    #[test]
    fn test_external_sign_out_closes_gated_modals() {
        let mut m = signed_in("u1");
        let now = Instant::now();
        update(&mut m, Intent::Gated(GatedAction::Rate), now);
        update(&mut m, Intent::AuthChanged(None), now);
        assert!(m.ui.rate.is_none());
    }

    #[test]
    fn test_profile_validation() {
        let mut m = signed_in("u1");
        let now = Instant::now();
        update(&mut m, Intent::Gated(GatedAction::EditProfile), now);
        assert_eq!(m.ui.profile.as_ref().unwrap().form.value("displayName"), "Thandi");

        update(&mut m, Intent::FocusPrev, now);
        type_str(&mut m, "ftp://x");
        assert!(update(&mut m, Intent::Submit, now).is_empty());
        assert_eq!(
            m.ui.profile.as_ref().unwrap().form.error("photoURL"),
            Some("Please enter a valid URL")
        );
    }

    #[test]
    fn test_fetch_failure_sets_directory_error() {
        let mut m = model();
        let now = Instant::now();
        let requests = update(&mut m, Intent::Refresh, now);
        assert_eq!(requests, vec![ApiRequest::FetchListings]);
        apply_response(
            &mut m,
            ApiResponse::Listings(Err(ApiError {
                message: "Failed to fetch services".into(),
                kind: ErrorType::NetworkError,
            })),
            now,
        );
        assert!(!m.directory.loading);
        assert_eq!(m.directory.error.as_deref(), Some("Failed to fetch services"));
        assert_eq!(m.ui.last_error, Some(ErrorType::NetworkError));
    }

    #[test]
    fn test_tick_dismisses_toast() {
        let mut m = model();
        let now = Instant::now();
        m.show_toast("hi", now);
        update(&mut m, Intent::Tick, now + Duration::from_secs(2));
        assert!(m.ui.toast_message.is_none());
    }
}
