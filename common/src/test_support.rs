//! Fixtures shared by the workspace's tests.
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::env_config::{Config, EmailConfig, JwtConfig};
use crate::jwt::{self, JwtClaims};

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Development config backed by the in-memory store, with email delivery
/// falling back to the log.
pub fn test_config() -> Config {
    Config {
        environment: "development".to_string(),
        database_url: "memory://".to_string(),
        base_url: "http://localhost:3000".to_string(),
        jwt_config: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        server_host: "127.0.0.1".to_string(),
        server_port: 8080,
        num_workers: 1,
        cors_allowed_origin: "http://localhost:3000".to_string(),
        console_logging_enabled: false,
        email: EmailConfig {
            api_key: None,
            from_address: "onboarding@resend.dev".to_string(),
        },
        seed_demo_data: false,
    }
}

/// Bearer header value for the given identity, signed with the test secret.
pub fn bearer_for(user_id: Uuid, email: &str) -> String {
    bearer_expiring_at(user_id, email, Utc::now() + Duration::hours(1))
}

/// Token that expired well outside the default validation leeway.
pub fn expired_bearer_for(user_id: Uuid, email: &str) -> String {
    bearer_expiring_at(user_id, email, Utc::now() - Duration::hours(2))
}

fn bearer_expiring_at(user_id: Uuid, email: &str, exp: DateTime<Utc>) -> String {
    let token = jwt::encode_claims(
        &JwtClaims {
            user_id,
            email: email.to_string(),
            exp: exp.timestamp() as usize,
        },
        TEST_JWT_SECRET,
    )
    .expect("token should encode");
    format!("Bearer {}", token)
}
