/// Common test utilities for integration tests
///
/// Builds an [`AuthService`] over an in-memory store with a low hashing
/// strength so login round trips stay fast.

use std::sync::Arc;
use tasklist_api::auth_service::{AuthService, LoginRequest, RegisterRequest};
use tasklist_api::store::InMemoryUserStore;
use tasklist_shared::auth::jwt::TokenIssuer;
use tasklist_shared::auth::password::CredentialHasher;
use tasklist_shared::config::{AuthConfig, JwtConfig, PasswordConfig};

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const TEST_EMAIL: &str = "user@example.com";
pub const TEST_PASSWORD: &str = "Secret1!";

/// Test context containing the service and the parts it was built from
pub struct TestContext {
    pub config: AuthConfig,
    pub issuer: Arc<TokenIssuer>,
    pub store: InMemoryUserStore,
    pub service: Arc<AuthService<InMemoryUserStore>>,
}

impl TestContext {
    /// Creates a context with an empty store
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Creates a context with production hashing parameters
    pub fn with_default_hashing() -> Self {
        Self::with_config(AuthConfig {
            password: PasswordConfig::default(),
            ..test_config()
        })
    }

    fn with_config(config: AuthConfig) -> Self {
        let issuer = Arc::new(TokenIssuer::new(&config.jwt).expect("valid jwt config"));
        let hasher = Arc::new(CredentialHasher::new(config.password.clone()));
        let store = InMemoryUserStore::new();
        let service = Arc::new(AuthService::new(hasher, issuer.clone(), store.clone()));

        Self {
            config,
            issuer,
            store,
            service,
        }
    }

    /// Registers the default test user
    pub async fn register_default_user(&self) {
        self.service
            .register(register_request(TEST_EMAIL, TEST_PASSWORD, TEST_PASSWORD))
            .await
            .expect("registration should succeed");
    }
}

/// Fast hashing configuration for tests
pub fn test_config() -> AuthConfig {
    AuthConfig {
        jwt: JwtConfig::with_secret(TEST_SECRET),
        password: PasswordConfig {
            strength: 1,
            salt_length: 16,
            hash_length: 32,
            timeout_secs: 5,
        },
    }
}

pub fn register_request(email: &str, password: &str, repeat: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        repeat_password: repeat.to_string(),
    }
}

pub fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}
