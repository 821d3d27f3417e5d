/// Authentication configuration
///
/// Process-wide settings for the credential hasher and the token issuer.
/// Loaded once at startup and never mutated afterwards.
///
/// # Environment Variables
///
/// - `JWT_SECRET`: Signing secret for tokens (required, at least 32 bytes)
/// - `JWT_ISSUER`: Issuer identifier (default: tasklist-api)
/// - `JWT_AUDIENCE`: Audience identifier (default: tasklist-clients)
/// - `JWT_SUBJECT`: Subject constant placed in every token (default: tasklist-auth)
/// - `JWT_VALIDITY_HOURS`: Token lifetime in hours (default: 24)
/// - `PASSWORD_HASH_STRENGTH`: Work factor, in thousands of PBKDF2 rounds (default: 64)
/// - `PASSWORD_SALT_LENGTH`: Salt length in bytes (default: 64)
/// - `PASSWORD_HASH_LENGTH`: Derived hash length in bytes (default: 32)
/// - `PASSWORD_HASH_TIMEOUT_SECS`: Upper bound for a single hash computation (default: 30)
///
/// # Example
///
/// ```no_run
/// use tasklist_shared::config::AuthConfig;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = AuthConfig::from_env()?;
/// println!("Tokens live for {} hours", config.jwt.validity_hours);
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Minimum accepted length of the signing secret, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Minimum accepted salt and hash length, in bytes
pub const MIN_CREDENTIAL_LENGTH: usize = 16;

/// Longest accepted token lifetime, in hours (ten years)
pub const MAX_VALIDITY_HOURS: i64 = 24 * 365 * 10;

/// PBKDF2 rounds per unit of strength
pub const ROUNDS_PER_STRENGTH: u32 = 1_000;

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token signing configuration
    pub jwt: JwtConfig,

    /// Password stretching configuration
    pub password: PasswordConfig,
}

/// Token signing configuration
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    /// Shared HMAC secret
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// `iss` claim
    pub issuer: String,

    /// `aud` claim
    pub audience: String,

    /// `sub` claim, a constant identifying the issuing service
    pub subject: String,

    /// Token lifetime in hours
    pub validity_hours: i64,
}

/// Password stretching configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    /// Work factor (PBKDF2 rounds = strength * 1000)
    pub strength: u32,

    /// Salt length in bytes
    pub salt_length: usize,

    /// Derived hash length in bytes
    pub hash_length: usize,

    /// Upper bound for one off-thread hash computation, in seconds
    pub timeout_secs: u64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("subject", &self.subject)
            .field("validity_hours", &self.validity_hours)
            .finish()
    }
}

impl JwtConfig {
    /// Creates a configuration with the given secret and default identifiers
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "tasklist-api".to_string(),
            audience: "tasklist-clients".to_string(),
            subject: "tasklist-auth".to_string(),
            validity_hours: 24,
        }
    }

    /// Token lifetime as a duration
    ///
    /// # Errors
    ///
    /// Returns an error if `validity_hours` is outside `1..=MAX_VALIDITY_HOURS`
    pub fn validity(&self) -> anyhow::Result<chrono::Duration> {
        if self.validity_hours <= 0 || self.validity_hours > MAX_VALIDITY_HOURS {
            anyhow::bail!(
                "JWT_VALIDITY_HOURS must be between 1 and {}",
                MAX_VALIDITY_HOURS
            );
        }
        chrono::Duration::try_hours(self.validity_hours)
            .context("JWT_VALIDITY_HOURS is out of range")
    }

    /// Checks startup invariants
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LENGTH);
        }
        if self.issuer.is_empty() || self.audience.is_empty() || self.subject.is_empty() {
            anyhow::bail!("JWT issuer, audience and subject must not be empty");
        }
        self.validity()?;
        Ok(())
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            strength: 64,
            salt_length: 64,
            hash_length: 32,
            timeout_secs: 30,
        }
    }
}

impl PasswordConfig {
    /// Number of PBKDF2 rounds for the configured strength
    pub fn rounds(&self) -> u32 {
        rounds_for_strength(self.strength)
    }

    /// Upper bound for one off-thread hash computation
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Checks startup invariants
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.strength == 0 {
            anyhow::bail!("PASSWORD_HASH_STRENGTH must be positive");
        }
        if self.salt_length < MIN_CREDENTIAL_LENGTH {
            anyhow::bail!("PASSWORD_SALT_LENGTH must be at least {} bytes", MIN_CREDENTIAL_LENGTH);
        }
        if self.hash_length < MIN_CREDENTIAL_LENGTH {
            anyhow::bail!("PASSWORD_HASH_LENGTH must be at least {} bytes", MIN_CREDENTIAL_LENGTH);
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("PASSWORD_HASH_TIMEOUT_SECS must be positive");
        }
        Ok(())
    }
}

/// PBKDF2 rounds for a strength value, saturating at `u32::MAX`
pub fn rounds_for_strength(strength: u32) -> u32 {
    strength.saturating_mul(ROUNDS_PER_STRENGTH)
}

impl AuthConfig {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 bytes
    /// - A numeric variable cannot be parsed
    /// - A value violates its constraint (see module docs)
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        let defaults = JwtConfig::with_secret(secret);
        let jwt = JwtConfig {
            issuer: lookup("JWT_ISSUER").unwrap_or(defaults.issuer.clone()),
            audience: lookup("JWT_AUDIENCE").unwrap_or(defaults.audience.clone()),
            subject: lookup("JWT_SUBJECT").unwrap_or(defaults.subject.clone()),
            validity_hours: parse_or(&lookup, "JWT_VALIDITY_HOURS", defaults.validity_hours)?,
            secret: defaults.secret,
        };
        jwt.validate()?;

        let fallback = PasswordConfig::default();
        let password = PasswordConfig {
            strength: parse_or(&lookup, "PASSWORD_HASH_STRENGTH", fallback.strength)?,
            salt_length: parse_or(&lookup, "PASSWORD_SALT_LENGTH", fallback.salt_length)?,
            hash_length: parse_or(&lookup, "PASSWORD_HASH_LENGTH", fallback.hash_length)?,
            timeout_secs: parse_or(&lookup, "PASSWORD_HASH_TIMEOUT_SECS", fallback.timeout_secs)?,
        };
        password.validate()?;

        Ok(Self { jwt, password })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value", key)),
        None => Ok(default),
    }
}
