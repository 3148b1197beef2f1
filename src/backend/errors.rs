use thiserror::Error;

/// Errors surfaced by the identity, document and object adapters
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),
    #[error("auth error: {0:?}")]
    Auth(AuthErrorCode),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not signed in")]
    Unauthenticated,
    #[error("http {status}: {message}")]
    Http { status: u16, message: String },
    #[error("decode error: {0}")]
    Decode(String),
}

impl BackendError {
    /// Provider auth code, when this is an auth failure
    pub fn auth_code(&self) -> Option<AuthErrorCode> {
        match self {
            BackendError::Auth(code) => Some(*code),
            BackendError::Network(_) => Some(AuthErrorCode::NetworkRequestFailed),
            BackendError::Unauthenticated => Some(AuthErrorCode::RequiresRecentLogin),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return BackendError::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return BackendError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        BackendError::Network(err.to_string())
    }
}

/// Identity-provider failure codes the client knows how to explain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    EmailAlreadyInUse,
    InvalidEmail,
    OperationNotAllowed,
    WeakPassword,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    TooManyRequests,
    NetworkRequestFailed,
    RequiresRecentLogin,
    Unknown,
}

impl AuthErrorCode {
    /// Map the identity toolkit's `error.message` string, which may carry a
    /// detail suffix ("WEAK_PASSWORD : Password should be at least 6 characters").
    pub fn from_provider_message(message: &str) -> Self {
        let code = message.split(':').next().unwrap_or("").trim();
        match code {
            "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthErrorCode::InvalidEmail,
            "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => {
                AuthErrorCode::OperationNotAllowed
            }
            "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
            "USER_DISABLED" => AuthErrorCode::UserDisabled,
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => AuthErrorCode::UserNotFound,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "MISSING_PASSWORD" => {
                AuthErrorCode::WrongPassword
            }
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorCode::TooManyRequests,
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" | "INVALID_ID_TOKEN"
            | "INVALID_REFRESH_TOKEN" => AuthErrorCode::RequiresRecentLogin,
            _ => AuthErrorCode::Unknown,
        }
    }

    /// Short message shown to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorCode::EmailAlreadyInUse => "This email is already registered",
            AuthErrorCode::InvalidEmail => "Invalid email address",
            AuthErrorCode::OperationNotAllowed => "Operation not allowed",
            AuthErrorCode::WeakPassword => "Password is too weak",
            AuthErrorCode::UserDisabled => "This account has been disabled",
            AuthErrorCode::UserNotFound => "No account found with this email",
            AuthErrorCode::WrongPassword => "Incorrect password",
            AuthErrorCode::TooManyRequests => "Too many attempts. Please try again later",
            AuthErrorCode::NetworkRequestFailed => "Network error. Please check your connection",
            AuthErrorCode::RequiresRecentLogin => "Please log in again to perform this action",
            AuthErrorCode::Unknown => "An error occurred. Please try again",
        }
    }
}
