/// Error handling for the authentication pipeline
///
/// This module provides a unified error type for pipeline operations and
/// maps it onto the [`ApiResponse`] envelope. Handlers return
/// `AuthResult<T>` and the caller converts the outcome with [`respond`].
///
/// # Example
///
/// ```
/// use tasklist_api::error::{respond, AuthError, AuthResult};
///
/// fn handler() -> AuthResult<String> {
///     Err(AuthError::AuthenticationFailed)
/// }
///
/// let response = respond(handler());
/// assert!(!response.is_success());
/// ```

use crate::envelope::{ApiResponse, FieldErrors};
use crate::store::StoreError;
use tasklist_shared::auth::{jwt::TokenError, password::CredentialError};

/// Pipeline result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Unified pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Request fields failed validation
    #[error("Validation failed: {} errors", .0.len())]
    Validation(FieldErrors),

    /// Unknown user or wrong password; deliberately indistinguishable
    #[error("Invalid email or password")]
    AuthenticationFailed,

    /// Username already registered
    #[error("Conflict: {message}")]
    Conflict { field: String, message: String },

    /// Hashing or stored-record failure
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Token issuance or validation failure
    #[error(transparent)]
    Token(#[from] TokenError),

    /// User store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// True for failures that are the server's fault, not the caller's
    pub fn is_server_fault(&self) -> bool {
        match self {
            AuthError::Credential(err) => err.is_server_fault(),
            AuthError::Token(TokenError::CreateError(_)) => true,
            AuthError::Store(_) => true,
            _ => false,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        if self.is_server_fault() {
            return "internal_error";
        }
        match self {
            AuthError::Validation(_) => "validation_error",
            AuthError::AuthenticationFailed => "unauthorized",
            AuthError::Conflict { .. } => "conflict",
            AuthError::Credential(_) => "bad_request",
            AuthError::Token(TokenError::Expired) => "token_expired",
            AuthError::Token(TokenError::MissingIdentity) => "bad_request",
            AuthError::Token(_) => "invalid_token",
            AuthError::Store(_) => "internal_error",
        }
    }
}

/// Converts a pipeline result into the response envelope
///
/// Server faults are logged here and reported with a generic message so no
/// internal detail reaches the caller.
pub fn respond<T>(result: AuthResult<T>) -> ApiResponse<T> {
    let err = match result {
        Ok(data) => return ApiResponse::success(data),
        Err(err) => err,
    };

    let code = err.code();
    if err.is_server_fault() {
        tracing::error!(error = %err, "Internal error");
        return ApiResponse::failure(code, "An internal error occurred");
    }

    match err {
        AuthError::Validation(errors) => ApiResponse::Failure {
            code: code.to_string(),
            message: "Request validation failed".to_string(),
            errors,
        },
        AuthError::Conflict { field, message } => {
            let mut errors = FieldErrors::new();
            errors.add(field, message.clone());
            ApiResponse::Failure {
                code: code.to_string(),
                message,
                errors,
            }
        }
        other => ApiResponse::failure(code, other.to_string()),
    }
}
