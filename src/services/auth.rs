use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{ServiceError, ServiceResult, UserService};
use crate::api::{AccountProfile, AuthUser, SignUpDetails};
use crate::backend::{BackendError, IdentityProvider};

/// Sign-in state and account management
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    users: UserService,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>, users: UserService) -> Self {
        Self { identity, users }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<AuthUser> {
        debug!("sign in {}", email);
        self.identity
            .sign_in(email.trim(), password)
            .await
            .map_err(ServiceError::auth)
    }

    /// Create the account, then its profile document
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        details: &SignUpDetails,
    ) -> ServiceResult<AuthUser> {
        debug!("sign up {}", email);
        let mut user = self
            .identity
            .sign_up(email.trim(), password)
            .await
            .map_err(ServiceError::auth)?;

        if !details.display_name.is_empty() || !details.photo_url.is_empty() {
            let profile = AccountProfile {
                display_name: Some(details.display_name.clone()).filter(|s| !s.is_empty()),
                photo_url: Some(details.photo_url.clone()).filter(|s| !s.is_empty()),
            };
            match self.identity.update_profile(&profile).await {
                Ok(updated) => user = updated,
                Err(e) => warn!("could not set account display name: {}", e),
            }
        }

        let email = user.email.clone().unwrap_or_else(|| email.trim().to_string());
        self.users.create_profile(&user.uid, &email, details).await?;
        Ok(user)
    }

    pub async fn logout(&self) -> ServiceResult<()> {
        self.identity
            .sign_out()
            .await
            .map_err(ServiceError::backend("Failed to log out. Please try again."))
    }

    /// Receiver yielding the signed-in user on every change
    pub fn on_auth_change(&self) -> watch::Receiver<Option<AuthUser>> {
        self.identity.subscribe()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.identity.current_user()
    }

    fn require_user(&self, message: &'static str) -> ServiceResult<AuthUser> {
        self.current_user().ok_or_else(|| {
            ServiceError::backend(message)(BackendError::Unauthenticated)
        })
    }

    pub async fn update_user_profile(&self, profile: &AccountProfile) -> ServiceResult<AuthUser> {
        const MESSAGE: &str = "Failed to update profile";
        self.require_user(MESSAGE)?;
        self.identity
            .update_profile(profile)
            .await
            .map_err(ServiceError::backend(MESSAGE))
    }

    pub async fn update_user_email(&self, email: &str) -> ServiceResult<()> {
        const MESSAGE: &str = "Failed to update email. You may need to re-authenticate.";
        self.require_user(MESSAGE)?;
        self.identity
            .update_email(email.trim())
            .await
            .map_err(ServiceError::backend(MESSAGE))
    }

    pub async fn update_user_password(&self, password: &str) -> ServiceResult<()> {
        const MESSAGE: &str = "Failed to update password. You may need to re-authenticate.";
        self.require_user(MESSAGE)?;
        self.identity
            .update_password(password)
            .await
            .map_err(ServiceError::backend(MESSAGE))
    }

    pub async fn send_password_reset(&self, email: &str) -> ServiceResult<()> {
        self.identity
            .send_password_reset(email.trim())
            .await
            .map_err(ServiceError::backend("Failed to send password reset email"))
    }

    pub async fn reauthenticate(&self, password: &str) -> ServiceResult<()> {
        const MESSAGE: &str = "Failed to re-authenticate. Please check your password.";
        let user = self.require_user(MESSAGE)?;
        if user.email.is_none() {
            return Err(ServiceError::Rejected(MESSAGE));
        }
        self.identity
            .reauthenticate(password)
            .await
            .map_err(ServiceError::backend(MESSAGE))
    }
}
