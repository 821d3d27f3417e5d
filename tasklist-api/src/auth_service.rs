/// Registration, login and token authentication
///
/// [`AuthService`] is the entry point the request pipeline calls with
/// already-parsed input:
///
/// - `register`: validate fields, hash the password off-thread, store the account
/// - `login`: look up the account, verify the password off-thread, issue a token
/// - `authenticate`: validate a presented token and return the caller's [`Identity`]
///
/// Unknown users and wrong passwords fail identically with
/// [`AuthError::AuthenticationFailed`].
///
/// # Example
///
/// ```no_run
/// use tasklist_api::auth_service::{AuthService, LoginRequest, RegisterRequest};
/// use tasklist_api::store::InMemoryUserStore;
/// use tasklist_shared::config::AuthConfig;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = AuthConfig::from_env()?;
/// let service = AuthService::from_config(&config, InMemoryUserStore::new())?;
///
/// service
///     .register(RegisterRequest {
///         email: "user@example.com".to_string(),
///         password: "Secret1!".to_string(),
///         repeat_password: "Secret1!".to_string(),
///     })
///     .await?;
///
/// let login = service
///     .login(LoginRequest {
///         email: "user@example.com".to_string(),
///         password: "Secret1!".to_string(),
///     })
///     .await?;
///
/// let identity = service.authenticate(&login.token)?;
/// assert_eq!(identity.username, "user@example.com");
/// # Ok(())
/// # }
/// ```

use crate::envelope::FieldErrors;
use crate::error::{AuthError, AuthResult};
use crate::store::{StoreError, UserStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tasklist_shared::{
    auth::{
        jwt::{TokenError, TokenIssuer},
        password::CredentialHasher,
    },
    config::AuthConfig,
    models::user::{CreateUserAccount, UserAccount},
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address, used as the username
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,

    /// Password confirmation
    #[validate(must_match(other = "password", message = "RepeatPassword must be same with Password"))]
    pub repeat_password: String,
}

impl RegisterRequest {
    /// Collects every field-level problem with the request
    ///
    /// Presence checks come first; format and match checks are reported
    /// only for fields that are present.
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if is_blank(&self.email) {
            errors.add("email", "Email is required");
        }
        if is_blank(&self.password) {
            errors.add("password", "Password is required");
        }
        if is_blank(&self.repeat_password) {
            errors.add("repeat_password", "RepeatPassword is required");
        }

        if let Err(e) = self.validate() {
            errors.merge_new_fields(e.into());
        }

        errors
    }
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    /// Authenticated username
    pub email: String,

    /// Signed access token
    pub token: String,

    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Authenticated caller, recovered from a validated token
///
/// Passed explicitly to downstream task operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Authenticated username
    pub username: String,

    /// `jti` of the presented token
    pub token_id: Uuid,

    /// Token expiration
    pub expires_at: DateTime<Utc>,
}

/// Authentication service
///
/// Cloning is cheap; hasher and issuer are shared behind `Arc`.
#[derive(Debug, Clone)]
pub struct AuthService<S> {
    hasher: Arc<CredentialHasher>,
    issuer: Arc<TokenIssuer>,
    store: S,
}

impl<S: UserStore> AuthService<S> {
    /// Creates a service from prepared components
    pub fn new(hasher: Arc<CredentialHasher>, issuer: Arc<TokenIssuer>, store: S) -> Self {
        Self {
            hasher,
            issuer,
            store,
        }
    }

    /// Creates a service from startup configuration
    ///
    /// # Errors
    ///
    /// Fails if the signing configuration is unusable; treat as fatal.
    pub fn from_config(config: &AuthConfig, store: S) -> anyhow::Result<Self> {
        let hasher = CredentialHasher::new(config.password.clone());
        let issuer = TokenIssuer::new(&config.jwt)?;

        Ok(Self::new(Arc::new(hasher), Arc::new(issuer), store))
    }

    /// Underlying user store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a new account
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` if any field is missing or invalid
    /// - `AuthError::Conflict` if the email is already registered
    pub async fn register(&self, req: RegisterRequest) -> AuthResult<UserAccount> {
        let errors = req.field_errors();
        if !errors.is_valid() {
            return Err(AuthError::Validation(errors));
        }

        if self.store.find_by_username(&req.email).await?.is_some() {
            return Err(email_taken());
        }

        let credentials = self.hasher.hash_async(req.password).await?;

        let account = self
            .store
            .create(CreateUserAccount {
                username: req.email,
                credentials,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => email_taken(),
                other => AuthError::Store(other),
            })?;

        tracing::info!(user_id = %account.id, username = %account.username, "Registered user");
        Ok(account)
    }

    /// Verifies credentials and issues a token
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` if email or password is empty
    /// - `AuthError::AuthenticationFailed` for an unknown user or wrong password;
    ///   both paths run one full password verification
    /// - `AuthError::Credential` if the stored record is corrupt
    pub async fn login(&self, req: LoginRequest) -> AuthResult<LoginResult> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.into()))?;

        let Some(account) = self.store.find_by_username(&req.email).await? else {
            // Match the stretching cost of a real record
            let config = self.hasher.config();
            let _verified = self
                .hasher
                .verify_async(
                    req.password,
                    vec![0u8; config.hash_length],
                    vec![0u8; config.salt_length],
                )
                .await?;
            tracing::warn!(username = %req.email, "Login rejected");
            return Err(AuthError::AuthenticationFailed);
        };

        let verified = self
            .hasher
            .verify_async(
                req.password,
                account.password_hash.clone(),
                account.password_salt.clone(),
            )
            .await?;
        if !verified {
            tracing::warn!(username = %req.email, "Login rejected");
            return Err(AuthError::AuthenticationFailed);
        }

        let now = Utc::now();
        let token = self.issuer.issue_at(&account.username, now)?;
        let expires_at = now
            .checked_add_signed(self.issuer.validity())
            .ok_or_else(|| TokenError::CreateError("expiration out of range".to_string()))?;

        tracing::info!(user_id = %account.id, username = %account.username, "Login succeeded");
        Ok(LoginResult {
            email: account.username,
            token,
            expires_at,
        })
    }

    /// Validates a presented token and returns the caller's identity
    ///
    /// # Errors
    ///
    /// `AuthError::Token` with the specific rejection reason
    pub fn authenticate(&self, token: &str) -> AuthResult<Identity> {
        let claims = self.issuer.validate(token).map_err(|e| {
            tracing::warn!(error = %e, "Token rejected");
            AuthError::Token(e)
        })?;

        let expires_at = claims
            .expires_at()
            .ok_or_else(|| TokenError::Malformed("exp out of range".to_string()))?;

        Ok(Identity {
            username: claims.email,
            token_id: claims.jti,
            expires_at,
        })
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn email_taken() -> AuthError {
    AuthError::Conflict {
        field: "email".to_string(),
        message: "Email has been registered".to_string(),
    }
}
