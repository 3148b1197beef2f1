use anyhow::Error;

use crate::backend::{AuthErrorCode, BackendError};
use crate::services::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Rejected,       // failed local checks, nothing was sent
    Credentials,    // identity provider said no
    Unauthorized,   // HTTP 401/403 or signed out
    NotFound,       // HTTP 404
    ServerError,    // HTTP 500+
    NetworkError,   // DNS, refused, timeout
    Other,
}

impl ErrorType {
    /// Short status-bar tag
    pub fn tag(&self) -> &'static str {
        match self {
            ErrorType::Rejected => "invalid",
            ErrorType::Credentials => "auth",
            ErrorType::Unauthorized => "denied",
            ErrorType::NotFound => "missing",
            ErrorType::ServerError => "server",
            ErrorType::NetworkError => "offline",
            ErrorType::Other => "error",
        }
    }
}

fn classify_backend(error: &BackendError) -> ErrorType {
    match error {
        BackendError::Network(_) => ErrorType::NetworkError,
        BackendError::Auth(AuthErrorCode::NetworkRequestFailed) => ErrorType::NetworkError,
        BackendError::Auth(_) => ErrorType::Credentials,
        BackendError::NotFound(_) => ErrorType::NotFound,
        BackendError::PermissionDenied(_) | BackendError::Unauthenticated => {
            ErrorType::Unauthorized
        }
        BackendError::Http { status, .. } => match status {
            401 | 403 => ErrorType::Unauthorized,
            404 => ErrorType::NotFound,
            500..=599 => ErrorType::ServerError,
            _ => ErrorType::Other,
        },
        BackendError::Decode(_) => ErrorType::Other,
    }
}

/// Classify a service failure for display
pub fn classify_error(error: &ServiceError) -> ErrorType {
    match error {
        ServiceError::Rejected(_) => ErrorType::Rejected,
        ServiceError::Auth(AuthErrorCode::NetworkRequestFailed) => ErrorType::NetworkError,
        ServiceError::Auth(AuthErrorCode::RequiresRecentLogin) => ErrorType::Unauthorized,
        ServiceError::Auth(_) => ErrorType::Credentials,
        ServiceError::Backend { source, .. } => classify_backend(source),
    }
}

/// Format a startup or I/O error - show the root cause
pub fn format_error_message(error: &Error) -> String {
    let mut source = error.source();
    let mut deepest = error.to_string();

    while let Some(err) = source {
        deepest = err.to_string();
        source = err.source();
    }

    deepest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(source: BackendError) -> ServiceError {
        ServiceError::Backend {
            message: "Failed to fetch services",
            source,
        }
    }

    #[test]
    fn test_classify_rejected() {
        let err = ServiceError::Rejected("Rating must be between 1 and 5");
        assert_eq!(classify_error(&err), ErrorType::Rejected);
    }

    #[test]
    fn test_classify_credentials() {
        let err = ServiceError::Auth(AuthErrorCode::WrongPassword);
        assert_eq!(classify_error(&err), ErrorType::Credentials);
    }

    #[test]
    fn test_classify_auth_network_failure() {
        let err = ServiceError::Auth(AuthErrorCode::NetworkRequestFailed);
        assert_eq!(classify_error(&err), ErrorType::NetworkError);
    }

    #[test]
    fn test_classify_network() {
        let err = backend(BackendError::Network("connection refused".into()));
        assert_eq!(classify_error(&err), ErrorType::NetworkError);
    }

    #[test]
    fn test_classify_http_statuses() {
        let status = |status| {
            classify_error(&backend(BackendError::Http {
                status,
                message: String::new(),
            }))
        };
        assert_eq!(status(401), ErrorType::Unauthorized);
        assert_eq!(status(404), ErrorType::NotFound);
        assert_eq!(status(503), ErrorType::ServerError);
        assert_eq!(status(418), ErrorType::Other);
    }

    #[test]
    fn test_classify_permission_denied() {
        let err = backend(BackendError::PermissionDenied("rules".into()));
        assert_eq!(classify_error(&err), ErrorType::Unauthorized);
    }

    #[test]
    fn test_format_shows_root_cause() {
        let inner = anyhow::anyhow!("No such file or directory");
        let outer = inner.context("Failed to read image");
        assert_eq!(format_error_message(&outer), "No such file or directory");
    }

    #[test]
    fn test_format_preserves_simple_errors() {
        let err = anyhow::anyhow!("custom error message");
        assert_eq!(format_error_message(&err), "custom error message");
    }
}
