//! Service layer
//!
//! One function per remote operation. Each translates backend failures into a
//! short message the UI can show as-is and logs the underlying cause.
//!
//! - auth: sign-in state and account changes
//! - listings: the listing collection
//! - storage: image uploads
//! - users: profile documents
//! - api: background worker running requests for the UI loop
//! - events: auth-state forwarding into the UI loop

pub mod api;
pub mod auth;
pub mod events;
pub mod listings;
pub mod storage;
pub mod users;

use thiserror::Error;

use crate::backend::{AuthErrorCode, Backend, BackendError};
use crate::config::Config;

pub use auth::AuthService;
pub use listings::ListingService;
pub use storage::StorageService;
pub use users::UserService;

/// Failure of a service operation, displayed verbatim to the user
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{}", .0.user_message())]
    Auth(AuthErrorCode),
    /// Rejected locally before any remote call
    #[error("{0}")]
    Rejected(&'static str),
    #[error("{message}")]
    Backend {
        message: &'static str,
        #[source]
        source: BackendError,
    },
}

impl ServiceError {
    pub(crate) fn backend(message: &'static str) -> impl FnOnce(BackendError) -> ServiceError {
        move |source| {
            tracing::error!("{}: {}", message, source);
            ServiceError::Backend { message, source }
        }
    }

    pub(crate) fn auth(source: BackendError) -> ServiceError {
        tracing::warn!("auth call failed: {}", source);
        ServiceError::Auth(source.auth_code().unwrap_or(AuthErrorCode::Unknown))
    }

    /// The backend error underneath, if any
    pub fn backend_source(&self) -> Option<&BackendError> {
        match self {
            ServiceError::Backend { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// All four services sharing one backend
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub listings: ListingService,
    pub storage: StorageService,
    pub users: UserService,
}

impl Services {
    pub fn new(backend: Backend, config: &Config) -> Self {
        let users = UserService::new(backend.documents.clone(), &config.users_collection);
        Self {
            auth: AuthService::new(backend.identity.clone(), users.clone()),
            listings: ListingService::new(backend.documents.clone(), &config.listings_collection),
            storage: StorageService::new(backend.objects.clone()),
            users,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_displays_user_message() {
        let err = ServiceError::Auth(AuthErrorCode::EmailAlreadyInUse);
        assert_eq!(err.to_string(), "This email is already registered");
    }

    #[test]
    fn test_backend_error_hides_cause_in_display() {
        let err = ServiceError::backend("Failed to fetch services")(BackendError::Http {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(err.to_string(), "Failed to fetch services");
        assert!(err.backend_source().is_some());
    }

    #[test]
    fn test_non_auth_failure_maps_to_unknown() {
        let err = ServiceError::auth(BackendError::Decode("bad".into()));
        assert_eq!(err.to_string(), "An error occurred. Please try again");
    }
}
