/// Password hashing module using salted PBKDF2-HMAC-SHA256
///
/// This module turns a plaintext password into a stored credential record
/// (hash + salt) and verifies later login attempts against it.
///
/// # Security
///
/// - **Algorithm**: PBKDF2 with HMAC-SHA256
/// - **Work factor**: `strength * 1000` rounds (default strength 64)
/// - **Salt**: 64 random bytes from the OS CSPRNG, fresh for every record
/// - **Output**: 32-byte hash
/// - **Comparison**: constant-time via `subtle`
///
/// Hash and salt are returned as separate byte sequences. The user store
/// persists both; the hasher never stores anything.
///
/// # Example
///
/// ```
/// use tasklist_shared::auth::password::{generate_salted_hash, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let record = generate_salted_hash(64, "Secret1!")?;
///
/// assert!(verify_password("Secret1!", &record.hash, &record.salt)?);
/// assert!(!verify_password("secret1!", &record.hash, &record.salt)?);
/// # Ok(())
/// # }
/// ```

use crate::config::{rounds_for_strength, PasswordConfig};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::Hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use std::fmt;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tokio::task::JoinHandle;

/// Error type for credential hashing operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Plaintext is empty or otherwise unusable
    #[error("Invalid credential format: {0}")]
    InvalidCredentialFormat(String),

    /// Stored hash or salt has an unexpected shape (data corruption)
    #[error("Malformed credential record: {0}")]
    MalformedCredentialRecord(String),

    /// Key derivation or the hashing worker failed
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    /// Off-thread hashing exceeded its configured bound
    #[error("Password hashing exceeded {0:?}")]
    HashingTimedOut(Duration),
}

impl CredentialError {
    /// True for failures that indicate a server-side fault rather than bad input
    pub fn is_server_fault(&self) -> bool {
        !matches!(self, CredentialError::InvalidCredentialFormat(_))
    }
}

/// A derived password hash together with the salt used to produce it
#[derive(Clone, PartialEq, Eq)]
pub struct SaltedHash {
    /// Output of the stretching function
    pub hash: Vec<u8>,

    /// Random per-record salt
    pub salt: Vec<u8>,
}

impl fmt::Debug for SaltedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaltedHash")
            .field("hash_len", &self.hash.len())
            .field("salt_len", &self.salt.len())
            .finish()
    }
}

impl SaltedHash {
    /// Encodes hash and salt as standard base64 strings for text columns
    ///
    /// Returns `(hash, salt)`.
    pub fn to_encoded(&self) -> (String, String) {
        (BASE64.encode(&self.hash), BASE64.encode(&self.salt))
    }

    /// Decodes a record previously produced by [`SaltedHash::to_encoded`]
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::MalformedCredentialRecord` if either value
    /// is not valid base64
    pub fn from_encoded(hash: &str, salt: &str) -> Result<Self, CredentialError> {
        let hash = BASE64.decode(hash).map_err(|e| {
            CredentialError::MalformedCredentialRecord(format!("hash is not valid base64: {}", e))
        })?;
        let salt = BASE64.decode(salt).map_err(|e| {
            CredentialError::MalformedCredentialRecord(format!("salt is not valid base64: {}", e))
        })?;

        Ok(Self { hash, salt })
    }
}

/// Salted password hasher with fixed, process-wide parameters
///
/// Cheap to clone; holds only the immutable [`PasswordConfig`].
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    config: PasswordConfig,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(PasswordConfig::default())
    }
}

impl CredentialHasher {
    /// Creates a hasher with the given parameters
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }

    /// Parameters in use
    pub fn config(&self) -> &PasswordConfig {
        &self.config
    }

    /// Hashes a password with a fresh random salt at the configured strength
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidCredentialFormat` if the password is empty
    pub fn generate_salted_hash(&self, plaintext: &str) -> Result<SaltedHash, CredentialError> {
        self.generate_with_strength(self.config.strength, plaintext)
    }

    /// Hashes a password with a fresh random salt at an explicit strength
    ///
    /// Records produced with a strength other than the configured one will not
    /// verify through [`CredentialHasher::verify_password`].
    pub fn generate_with_strength(
        &self,
        strength: u32,
        plaintext: &str,
    ) -> Result<SaltedHash, CredentialError> {
        ensure_plaintext(plaintext)?;
        if strength == 0 {
            return Err(CredentialError::InvalidCredentialFormat(
                "strength must be positive".to_string(),
            ));
        }

        let mut salt = vec![0u8; self.config.salt_length];
        OsRng.fill_bytes(&mut salt);

        let hash = derive(
            plaintext.as_bytes(),
            &salt,
            rounds_for_strength(strength),
            self.config.hash_length,
        )?;

        Ok(SaltedHash { hash, salt })
    }

    /// Verifies a password against a stored hash and salt
    ///
    /// The recomputed hash is compared in constant time. A mismatch is
    /// `Ok(false)`, never an error.
    ///
    /// # Errors
    ///
    /// - `CredentialError::MalformedCredentialRecord` if the stored hash or
    ///   salt does not have the configured length
    /// - `CredentialError::InvalidCredentialFormat` if the password is empty
    pub fn verify_password(
        &self,
        plaintext: &str,
        stored_hash: &[u8],
        stored_salt: &[u8],
    ) -> Result<bool, CredentialError> {
        if stored_hash.len() != self.config.hash_length {
            return Err(CredentialError::MalformedCredentialRecord(format!(
                "expected {}-byte hash, found {} bytes",
                self.config.hash_length,
                stored_hash.len()
            )));
        }
        if stored_salt.len() != self.config.salt_length {
            return Err(CredentialError::MalformedCredentialRecord(format!(
                "expected {}-byte salt, found {} bytes",
                self.config.salt_length,
                stored_salt.len()
            )));
        }
        ensure_plaintext(plaintext)?;

        let computed = derive(
            plaintext.as_bytes(),
            stored_salt,
            self.config.rounds(),
            self.config.hash_length,
        )?;

        Ok(computed.as_slice().ct_eq(stored_hash).into())
    }

    /// Runs [`CredentialHasher::generate_salted_hash`] on the blocking pool
    ///
    /// Bounded by the configured timeout so a stalled computation cannot hold
    /// the caller forever.
    pub async fn hash_async(&self, plaintext: String) -> Result<SaltedHash, CredentialError> {
        let hasher = self.clone();
        let task = tokio::task::spawn_blocking(move || hasher.generate_salted_hash(&plaintext));

        run_bounded(task, self.config.timeout()).await
    }

    /// Runs [`CredentialHasher::verify_password`] on the blocking pool
    pub async fn verify_async(
        &self,
        plaintext: String,
        stored_hash: Vec<u8>,
        stored_salt: Vec<u8>,
    ) -> Result<bool, CredentialError> {
        let hasher = self.clone();
        let task = tokio::task::spawn_blocking(move || {
            hasher.verify_password(&plaintext, &stored_hash, &stored_salt)
        });

        run_bounded(task, self.config.timeout()).await
    }
}

/// Hashes a password with default lengths at the given strength
///
/// The companion [`verify_password`] checks at the default strength (64).
/// Records made with any other strength must be verified through a
/// [`CredentialHasher`] configured with that strength.
///
/// # Errors
///
/// Returns `CredentialError::InvalidCredentialFormat` if the password is
/// empty or `strength` is zero
///
/// # Example
///
/// ```
/// use tasklist_shared::auth::password::generate_salted_hash;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let record = generate_salted_hash(64, "my_password")?;
/// assert_eq!(record.salt.len(), 64);
/// assert_eq!(record.hash.len(), 32);
/// # Ok(())
/// # }
/// ```
pub fn generate_salted_hash(strength: u32, plaintext: &str) -> Result<SaltedHash, CredentialError> {
    CredentialHasher::default().generate_with_strength(strength, plaintext)
}

/// Verifies a password against a record made with the default parameters
///
/// Only records hashed at strength 64 verify here; see [`generate_salted_hash`].
pub fn verify_password(
    plaintext: &str,
    stored_hash: &[u8],
    stored_salt: &[u8],
) -> Result<bool, CredentialError> {
    CredentialHasher::default().verify_password(plaintext, stored_hash, stored_salt)
}

fn ensure_plaintext(plaintext: &str) -> Result<(), CredentialError> {
    if plaintext.is_empty() {
        return Err(CredentialError::InvalidCredentialFormat(
            "password must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn derive(
    plaintext: &[u8],
    salt: &[u8],
    rounds: u32,
    hash_length: usize,
) -> Result<Vec<u8>, CredentialError> {
    let mut output = vec![0u8; hash_length];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(plaintext, salt, rounds, &mut output)
        .map_err(|e| CredentialError::HashingFailed(format!("Key derivation failed: {}", e)))?;

    Ok(output)
}

// The blocking thread is not interrupted on timeout; it finishes and its
// result is dropped.
async fn run_bounded<T>(
    task: JoinHandle<Result<T, CredentialError>>,
    limit: Duration,
) -> Result<T, CredentialError> {
    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(CredentialError::HashingFailed(format!(
            "Hashing worker failed: {}",
            e
        ))),
        Err(_) => {
            tracing::error!(limit_ms = limit.as_millis() as u64, "password hashing timed out");
            Err(CredentialError::HashingTimedOut(limit))
        }
    }
}
