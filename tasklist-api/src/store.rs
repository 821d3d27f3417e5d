/// User store abstraction
///
/// The pipeline reads and writes credential records through [`UserStore`].
/// The production backend lives outside this crate; [`InMemoryUserStore`]
/// backs tests and local runs.
///
/// # Example
///
/// ```
/// use tasklist_api::store::{InMemoryUserStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryUserStore::new();
/// assert!(store.find_by_username("nobody@example.com").await?.is_none());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tasklist_shared::models::user::{CreateUserAccount, UserAccount};
use tokio::sync::RwLock;

/// User store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Username is already taken
    #[error("Username already registered: {0}")]
    Duplicate(String),

    /// Backend could not serve the request
    #[error("User store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence seam for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up an account by exact (case-sensitive) username
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError>;

    /// Persists a new account
    ///
    /// Returns `StoreError::Duplicate` if the username is taken.
    async fn create(&self, data: CreateUserAccount) -> Result<UserAccount, StoreError>;
}

#[async_trait]
impl<S: UserStore + ?Sized> UserStore for Arc<S> {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        (**self).find_by_username(username).await
    }

    async fn create(&self, data: CreateUserAccount) -> Result<UserAccount, StoreError> {
        (**self).create(data).await
    }
}

/// In-memory user store keyed by username
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    accounts: Arc<RwLock<HashMap<String, UserAccount>>>,
}

impl InMemoryUserStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// True if no accounts are stored
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    /// Overwrites a stored account as-is
    ///
    /// Exists so tests can simulate corrupted records.
    pub async fn put(&self, account: UserAccount) {
        self.accounts
            .write()
            .await
            .insert(account.username.clone(), account);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn create(&self, data: CreateUserAccount) -> Result<UserAccount, StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&data.username) {
            return Err(StoreError::Duplicate(data.username));
        }

        let account = UserAccount::new(data);
        accounts.insert(account.username.clone(), account.clone());
        Ok(account)
    }
}
