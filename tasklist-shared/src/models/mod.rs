/// Data models for Tasklist
///
/// # Models
///
/// - `user`: User accounts and their stored credentials
///
/// # Example
///
/// ```
/// use tasklist_shared::auth::password::CredentialHasher;
/// use tasklist_shared::models::user::{CreateUserAccount, UserAccount};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = CredentialHasher::default().generate_salted_hash("Secret1!")?;
///
/// let account = UserAccount::new(CreateUserAccount {
///     username: "user@example.com".to_string(),
///     credentials,
/// });
/// assert_eq!(account.password_salt.len(), 64);
/// # Ok(())
/// # }
/// ```

pub mod user;
