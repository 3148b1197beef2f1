//! Session Model
//!
//! Who is signed in, as last reported by the identity provider, plus their
//! profile document once it has been fetched.

use crate::api::{AuthUser, UserProfile};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionModel {
    pub user: Option<AuthUser>,
    pub profile: Option<UserProfile>,
    /// False until the provider has reported once
    pub resolved: bool,
}

impl SessionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an auth-state change. Returns true when a different user is now
    /// signed in and their profile should be fetched.
    pub fn apply_auth_change(&mut self, user: Option<AuthUser>) -> bool {
        self.resolved = true;

        let same_uid = match (&self.user, &user) {
            (Some(old), Some(new)) => old.uid == new.uid,
            (None, None) => true,
            _ => false,
        };
        if !same_uid {
            self.profile = None;
        }

        let needs_profile = !same_uid && user.is_some();
        self.user = user;
        needs_profile
    }

    pub fn set_profile(&mut self, profile: Option<UserProfile>) {
        // A late response for a previous user, or after sign-out, is ignored
        if let Some(p) = &profile {
            match &self.user {
                Some(user) if user.uid == p.uid => {}
                _ => return,
            }
        }
        self.profile = profile;
    }

    pub fn clear(&mut self) {
        self.user = None;
        self.profile = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn uid(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.uid.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.email.as_deref())
    }

    /// Profile name, then account name, then the email's local part
    pub fn display_name(&self) -> String {
        if let Some(name) = self
            .profile
            .as_ref()
            .map(|p| p.display_name.trim())
            .filter(|n| !n.is_empty())
        {
            return name.to_string();
        }

        let Some(user) = &self.user else {
            return "Guest".to_string();
        };

        if let Some(name) = user.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }

        user.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("User")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(uid: &str, name: Option<&str>) -> AuthUser {
        AuthUser {
            uid: uid.into(),
            email: Some("thandi@example.com".into()),
            display_name: name.map(str::to_string),
            photo_url: None,
        }
    }

    fn profile(uid: &str, name: &str) -> UserProfile {
        serde_json::from_value(serde_json::json!({ "uid": uid, "displayName": name })).unwrap()
    }

    #[test]
    fn test_sign_in_requests_profile_once() {
        let mut s = SessionModel::new();
        assert!(!s.resolved);
        assert!(!s.apply_auth_change(None));
        assert!(s.resolved);

        assert!(s.apply_auth_change(Some(user("u1", None))));
        assert!(!s.apply_auth_change(Some(user("u1", Some("Thandi")))));
        assert_eq!(s.user.as_ref().and_then(|u| u.display_name.as_deref()), Some("Thandi"));
    }

    #[test]
    fn test_user_switch_drops_profile() {
        let mut s = SessionModel::new();
        s.apply_auth_change(Some(user("u1", None)));
        s.set_profile(Some(profile("u1", "Thandi")));
        assert!(s.apply_auth_change(Some(user("u2", None))));
        assert!(s.profile.is_none());
    }

    #[test]
    fn test_stale_profile_ignored() {
        let mut s = SessionModel::new();
        s.apply_auth_change(Some(user("u2", None)));
        s.set_profile(Some(profile("u1", "Old")));
        assert!(s.profile.is_none());
    }

    #[test]
    fn test_profile_after_sign_out_ignored() {
        let mut s = SessionModel::new();
        s.apply_auth_change(Some(user("u1", None)));
        s.apply_auth_change(None);
        s.set_profile(Some(profile("u1", "Thandi")));
        assert!(s.profile.is_none());
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut s = SessionModel::new();
        assert_eq!(s.display_name(), "Guest");

        s.apply_auth_change(Some(user("u1", None)));
        assert_eq!(s.display_name(), "thandi");

        s.apply_auth_change(Some(user("u1", Some("T. Nkosi"))));
        assert_eq!(s.display_name(), "T. Nkosi");

        s.set_profile(Some(profile("u1", "Thandi Nkosi")));
        assert_eq!(s.display_name(), "Thandi Nkosi");

        s.clear();
        assert!(!s.is_signed_in());
    }
}
