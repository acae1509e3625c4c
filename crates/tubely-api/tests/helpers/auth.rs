use std::time::Duration;
use tubely_api::auth::JwtIdentityProvider;
use uuid::Uuid;

/// Shared secret used by the test config (at least 32 characters).
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// Test user with a valid bearer token
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn create_test_user(identity: &JwtIdentityProvider) -> TestUser {
    let user_id = Uuid::new_v4();
    let token = identity
        .issue_token(user_id, Duration::from_secs(3600))
        .expect("Failed to sign test token");
    TestUser { user_id, token }
}
