/// User account model
///
/// A user account is the credential record owned by the user store: a
/// unique username plus the hash and salt produced by
/// [`CredentialHasher`](crate::auth::password::CredentialHasher).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(255) NOT NULL UNIQUE,
///     password_hash BYTEA NOT NULL,
///     password_salt BYTEA NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Username comparison is case-sensitive, exactly as stored.

use crate::auth::password::SaltedHash;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// User account with its stored credentials
///
/// Hash and salt are never serialized, so the account can be handed back
/// to callers as-is.
#[derive(Clone, Serialize)]
pub struct UserAccount {
    /// Unique account ID (UUID v4)
    pub id: Uuid,

    /// Login name (the email address), unique and case-sensitive
    pub username: String,

    /// Stretched password hash
    #[serde(skip_serializing)]
    pub password_hash: Vec<u8>,

    /// Salt used for `password_hash`
    #[serde(skip_serializing)]
    pub password_salt: Vec<u8>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the credentials were last replaced
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Input for creating a new user account
#[derive(Debug, Clone)]
pub struct CreateUserAccount {
    /// Login name
    pub username: String,

    /// Freshly generated hash and salt (NOT a plaintext password!)
    pub credentials: SaltedHash,
}

impl UserAccount {
    /// Builds a new account record stamped with the current UTC time
    pub fn new(data: CreateUserAccount) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            username: data.username,
            password_hash: data.credentials.hash,
            password_salt: data.credentials.salt,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stored credentials as a [`SaltedHash`]
    pub fn credentials(&self) -> SaltedHash {
        SaltedHash {
            hash: self.password_hash.clone(),
            salt: self.password_salt.clone(),
        }
    }

    /// Replaces the stored credentials with a newly generated pair
    ///
    /// The old salt is discarded; callers must pass a fresh
    /// [`SaltedHash`], never one derived from the previous salt.
    pub fn replace_credentials(&mut self, credentials: SaltedHash) {
        self.password_hash = credentials.hash;
        self.password_salt = credentials.salt;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UserAccount {
        UserAccount::new(CreateUserAccount {
            username: "alice@example.com".to_string(),
            credentials: SaltedHash {
                hash: vec![1; 32],
                salt: vec![2; 64],
            },
        })
    }

    #[test]
    fn test_new_account() {
        let account = sample();

        assert_eq!(account.username, "alice@example.com");
        assert_eq!(account.created_at, account.updated_at);
        assert_eq!(account.credentials().hash, vec![1; 32]);
        assert_eq!(account.credentials().salt, vec![2; 64]);
    }

    #[test]
    fn test_serialization_omits_credentials() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["username"], "alice@example.com");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password_salt").is_none());
    }

    #[test]
    fn test_replace_credentials() {
        let mut account = sample();
        let before = account.updated_at;

        account.replace_credentials(SaltedHash {
            hash: vec![3; 32],
            salt: vec![4; 64],
        });

        assert_eq!(account.password_salt, vec![4; 64]);
        assert!(account.updated_at >= before);
    }

    #[test]
    fn test_debug_omits_credentials() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("password_hash"));
    }
}
