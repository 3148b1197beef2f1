//! Auth gating
//!
//! Actions that need a signed-in user. When nobody is signed in the UI opens
//! the sign-in prompt instead and drops the action.

use crate::api::{AuthUser, Listing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedAction {
    Contact,
    Rate,
    AddListing,
    DeleteListing,
    EditProfile,
}

impl GatedAction {
    /// Prompt shown above the sign-in form
    pub fn prompt(&self) -> &'static str {
        match self {
            GatedAction::Contact => "Sign in to view contact details",
            GatedAction::Rate => "Sign in to rate this service",
            GatedAction::AddListing => "Sign in to add a service",
            GatedAction::DeleteListing => "Sign in to manage your services",
            GatedAction::EditProfile => "Sign in to edit your profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Allowed,
    /// Nobody signed in: prompt for credentials
    NeedsSignIn,
    /// Signed in but not the owner of the listing
    Forbidden,
}

/// Decide whether `user` may perform `action`, optionally on `listing`
///
/// # Examples
/// ```
/// use servicefinder::logic::gating::{authorize, Gate, GatedAction};
///
/// assert_eq!(authorize(GatedAction::Rate, None, None), Gate::NeedsSignIn);
/// ```
pub fn authorize(action: GatedAction, user: Option<&AuthUser>, listing: Option<&Listing>) -> Gate {
    let Some(user) = user else {
        return Gate::NeedsSignIn;
    };

    match (action, listing) {
        (GatedAction::DeleteListing, Some(listing)) if !listing.is_owned_by(&user.uid) => {
            Gate::Forbidden
        }
        (GatedAction::DeleteListing, None) => Gate::Forbidden,
        _ => Gate::Allowed,
    }
}
