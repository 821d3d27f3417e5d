/// JWT token issuance and validation module
///
/// Tokens carry the authenticated username and are signed with HS256
/// (HMAC-SHA256) using a shared secret fixed at process start.
///
/// # Security
///
/// - **Algorithm**: HS256 only; tokens declaring any other algorithm are rejected
/// - **Expiration**: `exp = iat + validity` (default 24 hours); a token is expired
///   once `now >= exp`
/// - **Validation order**: structure, signature, issuer/audience, then expiry
/// - **Secret Management**: Secrets must be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use tasklist_shared::auth::jwt::TokenIssuer;
/// use tasklist_shared::config::JwtConfig;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new(&JwtConfig::with_secret("your-secret-key-at-least-32-bytes"))?;
///
/// let token = issuer.issue("alice@example.com")?;
/// let claims = issuer.validate(&token)?;
/// assert_eq!(claims.email, "alice@example.com");
/// # Ok(())
/// # }
/// ```

use crate::config::JwtConfig;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Identity claim was empty
    #[error("Identity claim must not be empty")]
    MissingIdentity,

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token structure could not be parsed
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Recomputed signature does not match
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signed by us, but for a different issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Signed by us, but for a different audience
    #[error("Invalid token audience")]
    InvalidAudience,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
            ErrorKind::InvalidAudience => TokenError::InvalidAudience,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (service-level constant)
/// - `jti`: Unique token ID
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `iss`: Issuer
/// - `aud`: Audience
///
/// # Custom Claims
///
/// - `email`: Authenticated username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject
    pub sub: String,

    /// Token ID, unique per issuance
    pub jti: Uuid,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Identity claim
    pub email: String,
}

impl Claims {
    /// Checks if the token is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Expiration as a UTC timestamp, `None` if `exp` is out of range
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Time remaining at `now`, or `None` once expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Option<Duration> {
        let now = now.timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Issues and validates signed identity tokens
///
/// Keys are derived once from the configured secret. Safe to share across
/// threads; every operation is read-only.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    subject: String,
    validity: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("subject", &self.subject)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer from validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration violates its startup invariants
    /// (secret shorter than 32 bytes, empty identifiers, validity outside
    /// one hour to ten years).
    pub fn new(config: &JwtConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "aud", "sub"]);
        // Expiry is checked against the caller's clock in `validate_at`
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            subject: config.subject.clone(),
            validity: config.validity()?,
        })
    }

    /// Token lifetime
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issues a token for `identity` at the current time
    pub fn issue(&self, identity: &str) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issues a token for `identity` as if the current time were `now`
    ///
    /// # Errors
    ///
    /// - `TokenError::MissingIdentity` if `identity` is empty
    /// - `TokenError::CreateError` if encoding fails
    pub fn issue_at(&self, identity: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        if identity.is_empty() {
            return Err(TokenError::MissingIdentity);
        }

        let issued_at = now.timestamp();
        let claims = Claims {
            sub: self.subject.clone(),
            jti: Uuid::new_v4(),
            iat: issued_at,
            exp: issued_at + self.validity.num_seconds(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            email: identity.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))?;

        tracing::debug!(jti = %claims.jti, exp = claims.exp, "issued token");
        Ok(token)
    }

    /// Validates a token at the current time and returns its claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validates a token as if the current time were `now`
    ///
    /// # Errors
    ///
    /// - `TokenError::Malformed` if the token cannot be parsed or declares
    ///   an algorithm other than HS256
    /// - `TokenError::InvalidSignature` if the signature does not match
    /// - `TokenError::InvalidIssuer` / `TokenError::InvalidAudience` on
    ///   mismatched `iss` / `aud`
    /// - `TokenError::Expired` if `now >= exp`
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.email.is_empty() {
            return Err(TokenError::Malformed("identity claim is empty".to_string()));
        }
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Validates a token and returns only the identity claim
    pub fn identity(&self, token: &str) -> Result<String, TokenError> {
        self.validate(token).map(|claims| claims.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&JwtConfig::with_secret(SECRET)).expect("valid config")
    }

    #[test]
    fn test_issue_and_validate() {
        let issuer = issuer();

        let token = issuer.issue("alice@example.com").expect("Should create token");
        assert_eq!(token.split('.').count(), 3);

        let claims = issuer.validate(&token).expect("Should validate token");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(issuer.identity(&token).unwrap(), "alice@example.com");
    }

    #[test]
    fn test_claims_contents() {
        let issuer = issuer();
        let now = Utc::now();

        let token = issuer.issue_at("bob", now).unwrap();
        let claims = issuer.validate_at(&token, now).unwrap();

        assert_eq!(claims.sub, "tasklist-auth");
        assert_eq!(claims.iss, "tasklist-api");
        assert_eq!(claims.aud, "tasklist-clients");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(
            claims.time_until_expiration(now),
            Some(Duration::hours(24))
        );
    }

    #[test]
    fn test_token_ids_are_unique() {
        let issuer = issuer();

        let a = issuer.validate(&issuer.issue("carol").unwrap()).unwrap();
        let b = issuer.validate(&issuer.issue("carol").unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_validity_window_scenario() {
        let issuer = issuer();
        let issued = Utc::now();
        let token = issuer.issue_at("alice@example.com", issued).unwrap();

        let claims = issuer
            .validate_at(&token, issued + Duration::hours(23))
            .expect("Token should still be valid");
        assert_eq!(claims.email, "alice@example.com");

        let result = issuer.validate_at(&token, issued + Duration::hours(25));
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let issuer = issuer();
        let issued = Utc::now();
        let token = issuer.issue_at("dave", issued).unwrap();
        let exp = issued + issuer.validity();

        assert!(issuer.validate_at(&token, exp - Duration::seconds(1)).is_ok());
        assert!(matches!(
            issuer.validate_at(&token, exp),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_custom_validity() {
        let mut config = JwtConfig::with_secret(SECRET);
        config.validity_hours = 1;
        let issuer = TokenIssuer::new(&config).unwrap();
        let issued = Utc::now();

        let token = issuer.issue_at("erin", issued).unwrap();
        let claims = issuer.validate_at(&token, issued).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.expires_at().unwrap() > issued);
    }

    #[test]
    fn test_oversized_validity_rejected() {
        let mut config = JwtConfig::with_secret(SECRET);
        config.validity_hours = i64::MAX;
        assert!(TokenIssuer::new(&config).is_err());

        config.validity_hours = 1_000_000_000_000;
        assert!(TokenIssuer::new(&config).is_err());
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = issuer().issue("frank").unwrap();
        let other = TokenIssuer::new(&JwtConfig::with_secret(
            "another-secret-key-at-least-32-bytes-long",
        ))
        .unwrap();

        assert!(matches!(
            other.validate(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let issued = Utc::now() - Duration::days(3);
        let token = issuer().issue_at("grace", issued).unwrap();
        let other = TokenIssuer::new(&JwtConfig::with_secret(
            "another-secret-key-at-least-32-bytes-long",
        ))
        .unwrap();

        assert!(matches!(
            other.validate(&token),
            Err(TokenError::InvalidSignature)
        ));
        assert!(matches!(issuer().validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_single_byte_mutation_never_validates() {
        let issuer = issuer();
        let token = issuer.issue("heidi@example.com").unwrap();

        for index in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            let mutated = String::from_utf8(bytes).unwrap();

            match issuer.validate(&mutated) {
                Err(TokenError::InvalidSignature) | Err(TokenError::Malformed(_)) => {}
                other => panic!("mutation at {} produced {:?}", index, other),
            }
        }
    }

    #[test]
    fn test_garbage_is_malformed() {
        let issuer = issuer();

        for input in ["", "abc", "a.b", "a.b.c", "not.a.token.at.all"] {
            assert!(
                matches!(issuer.validate(input), Err(TokenError::Malformed(_))),
                "input {:?} should be malformed",
                input
            );
        }
    }

    #[test]
    fn test_foreign_issuer_and_audience_rejected() {
        let mut foreign_iss = JwtConfig::with_secret(SECRET);
        foreign_iss.issuer = "someone-else".to_string();
        let token = TokenIssuer::new(&foreign_iss).unwrap().issue("ivan").unwrap();
        assert!(matches!(
            issuer().validate(&token),
            Err(TokenError::InvalidIssuer)
        ));

        let mut foreign_aud = JwtConfig::with_secret(SECRET);
        foreign_aud.audience = "other-clients".to_string();
        let token = TokenIssuer::new(&foreign_aud).unwrap().issue("ivan").unwrap();
        assert!(matches!(
            issuer().validate(&token),
            Err(TokenError::InvalidAudience)
        ));
    }

    #[test]
    fn test_empty_identity_rejected() {
        assert!(matches!(
            issuer().issue(""),
            Err(TokenError::MissingIdentity)
        ));
    }

    #[test]
    fn test_short_secret_rejected_at_startup() {
        assert!(TokenIssuer::new(&JwtConfig::with_secret("short")).is_err());
    }

    #[test]
    fn test_debug_hides_keys() {
        let rendered = format!("{:?}", issuer());
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("tasklist-api"));
    }
}
