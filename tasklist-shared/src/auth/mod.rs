/// Authentication primitives
///
/// This module provides the credential and token core for Tasklist:
///
/// # Modules
///
/// - [`password`]: Salted PBKDF2-HMAC-SHA256 hashing and verification
/// - [`jwt`]: HS256 token issuance and validation
///
/// # Security Features
///
/// - **Password Hashing**: 64-byte random salt, `strength * 1000` PBKDF2 rounds
/// - **JWT Tokens**: HS256 signing with a fixed validity window
/// - **Constant-time Comparison**: Hash verification never short-circuits
///
/// # Example
///
/// ```no_run
/// use tasklist_shared::auth::jwt::TokenIssuer;
/// use tasklist_shared::auth::password::CredentialHasher;
/// use tasklist_shared::config::AuthConfig;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AuthConfig::from_env()?;
/// let hasher = CredentialHasher::new(config.password.clone());
/// let issuer = TokenIssuer::new(&config.jwt)?;
///
/// let record = hasher.generate_salted_hash("user_password")?;
/// if hasher.verify_password("user_password", &record.hash, &record.salt)? {
///     let token = issuer.issue("user@example.com")?;
///     assert_eq!(issuer.identity(&token)?, "user@example.com");
/// }
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
