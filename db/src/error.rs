use common::error::{AppError, DependencyKind};

/// Unique constraint names, shared by every backend so services can
/// translate violations into domain errors.
pub mod constraints {
    pub const USERS_EMAIL: &str = "users_email_key";
    pub const USERS_REFERRAL_CODE: &str = "users_referral_code_key";
    pub const INVITES_TOKEN: &str = "invites_token_key";
    pub const INVITES_INVITER_EMAIL: &str = "invites_inviter_id_email_key";
    pub const REFERRALS_SIGNUP_USER: &str = "referrals_signup_user_id_key";
}

// Postgres SQLSTATE for a missing relation.
const UNDEFINED_TABLE: &str = "42P01";

/// Classifies a driver error: unique violations keep their constraint name,
/// everything else becomes a dependency failure with an operator-facing subcode.
pub fn from_sqlx(err: sqlx::Error) -> AppError {
    let kind = match &err {
        sqlx::Error::Database(db_err) => {
            if db_err.is_unique_violation() {
                return AppError::UniqueViolation(
                    db_err.constraint().unwrap_or("unknown").to_string(),
                );
            }
            if db_err.is_foreign_key_violation() {
                return AppError::BadRequest("Referenced record does not exist".to_string());
            }
            if db_err.code().as_deref() == Some(UNDEFINED_TABLE) {
                DependencyKind::SchemaNotInitialized
            } else {
                DependencyKind::Other
            }
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => DependencyKind::Unreachable,
        _ => DependencyKind::Other,
    };

    AppError::Dependency {
        kind,
        detail: err.to_string(),
    }
}

/// True when `err` is a unique violation on `constraint`.
pub fn is_violation_of(err: &AppError, constraint: &str) -> bool {
    matches!(err, AppError::UniqueViolation(name) if name == constraint)
}
