use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Holds everything needed to start the referral service: store
/// connection, public base URL for shareable links, bearer token
/// validation, HTTP server settings, logging and invite email delivery.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// Connection string of the backing store. The scheme selects the backend.
    pub database_url: String,
    /// Public base URL used to build referral and invite links, without a trailing slash.
    pub base_url: String,
    /// Configuration for validating bearer tokens issued by the auth provider.
    pub jwt_config: JwtConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Invite email delivery settings.
    pub email: EmailConfig,
    /// Whether to insert the demo users, invites and referral on startup.
    pub seed_demo_data: bool,
}

#[derive(Clone, Debug)]
/// Configuration for JSON Web Token (JWT) authentication.
///
/// Tokens are issued by the auth provider; this service only verifies them
/// with the shared secret.
pub struct JwtConfig {
    /// The secret key used to verify JWTs.
    pub secret: String,
}

#[derive(Clone, Debug)]
/// Settings for the transactional email API.
///
/// Without an API key invite emails are written to the log instead of being sent.
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub from_address: String,
}

impl JwtConfig {
    /// Creates a new `JwtConfig` instance from environment variables.
    ///
    /// Reads `JWT_SECRET`, the secret shared with the auth provider.
    ///
    /// # Panics
    ///
    /// This function will panic if `JWT_SECRET` is not set.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        JwtConfig {
            secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
        }
    }
}

impl EmailConfig {
    pub fn from_env() -> Self {
        EmailConfig {
            api_key: env::var("RESEND_API_KEY").ok().filter(|key| !key.is_empty()),
            from_address: env::var("RESEND_FROM_EMAIL")
                .unwrap_or_else(|_| "onboarding@resend.dev".to_string()),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `DATABASE_URL`: Store connection string (`postgres://...` or `memory://`)
    /// - `JWT_SECRET`: Secret key for JWT validation (via `JwtConfig::from_env()`)
    ///
    /// Optional (with defaults):
    /// - `ENVIRONMENT`: "development" or "production" (default: "development")
    /// - `BASE_URL`: Public base URL (default: "http://localhost:3000")
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `RESEND_API_KEY`: Email API key (default: unset, emails are logged)
    /// - `RESEND_FROM_EMAIL`: Sender address (default: "onboarding@resend.dev")
    /// - `SEED_DEMO_DATA`: Insert demo data on startup (default: false)
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            base_url: normalize_base_url(
                &env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
            jwt_config: JwtConfig::from_env(),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: env_flag("ENABLE_CONSOLE_LOGGING", true),
            email: EmailConfig::from_env(),
            seed_demo_data: env_flag("SEED_DEMO_DATA", false),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Shareable signup link carrying a referral code.
    pub fn referral_url(&self, referral_code: &str) -> String {
        format!("{}/signup?ref={}", self.base_url, referral_code)
    }

    /// Signup link sent in invite emails.
    pub fn invite_url(&self, referral_code: &str, token: &str) -> String {
        format!("{}&invite={}", self.referral_url(referral_code), token)
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|value| value.to_lowercase() == "true")
        .unwrap_or(default)
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
