use std::fmt;

use actix_web::HttpResponse;
use thiserror::Error;
use uuid::Uuid;

pub type Res<T> = std::result::Result<T, AppError>;

/// Distinguishes store failures so operators can tell a missing migration
/// from a network problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    SchemaNotInitialized,
    Unreachable,
    Other,
}

impl DependencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::SchemaNotInitialized => "schema_not_initialized",
            DependencyKind::Unreachable => "unreachable",
            DependencyKind::Other => "error",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("JWT error: {0}")]
    JWT(#[from] jsonwebtoken::errors::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    // === STORE ERRORS ===
    #[error("Database error ({kind}): {detail}")]
    Dependency { kind: DependencyKind, detail: String },

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    // === DOMAIN ERRORS ===
    #[error("User with this email already exists")]
    DuplicateEmail { user_id: Option<Uuid> },

    #[error("Invalid referral code")]
    InvalidReferralCode,

    #[error("Cannot use your own referral code")]
    SelfReferral,

    #[error("You cannot invite yourself")]
    SelfInvite,

    #[error("You have already invited this email")]
    DuplicateInvite { invite_id: Option<Uuid> },

    #[error("A referral already exists for this user")]
    DuplicateReferral,

    // === APPLICATION ERRORS ===
    #[error("Authorization error: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn to_http_response(&self) -> HttpResponse {
        let is_dev = cfg!(debug_assertions);

        let to_internal_json = |err_msg: &str| {
            if is_dev {
                serde_json::json!({ "error": err_msg })
            } else {
                serde_json::json!({ "error": "Internal server error" })
            }
        };

        match self {
            // === CONVERSION ERRORS ===
            AppError::JWT(error) => {
                log::error!("JWT error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
            AppError::Reqwest(error) => {
                log::error!("Reqwest error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }

            // === STORE ERRORS ===
            AppError::Dependency { kind, detail } => {
                log::error!("Database error ({}): {}", kind, detail);
                let mut body = to_internal_json(detail);
                body["database"] = serde_json::json!(kind.as_str());
                HttpResponse::InternalServerError().json(body)
            }
            AppError::UniqueViolation(constraint) => {
                log::warn!("Unhandled unique violation on {}", constraint);
                HttpResponse::Conflict().json(serde_json::json!({ "error": "Resource already exists" }))
            }

            // === DOMAIN ERRORS ===
            AppError::DuplicateEmail { user_id } => HttpResponse::Conflict()
                .json(serde_json::json!({ "error": self.to_string(), "userId": user_id })),
            AppError::DuplicateInvite { invite_id } => HttpResponse::Conflict()
                .json(serde_json::json!({ "error": self.to_string(), "inviteId": invite_id })),
            AppError::DuplicateReferral => {
                HttpResponse::Conflict().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::InvalidReferralCode | AppError::SelfReferral | AppError::SelfInvite => {
                HttpResponse::BadRequest().json(serde_json::json!({ "error": self.to_string() }))
            }

            // === APPLICATION ERRORS ===
            AppError::Unauthorized(_) => {
                HttpResponse::Unauthorized().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::NotFound(_) => {
                HttpResponse::NotFound().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::BadRequest(_) => {
                HttpResponse::BadRequest().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::Conflict(_) => {
                HttpResponse::Conflict().json(serde_json::json!({ "error": self.to_string() }))
            }

            AppError::Internal(error) => {
                log::error!("Internal error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(AppError::BadRequest("email is required".to_string()), StatusCode::BAD_REQUEST)]
    #[case(AppError::InvalidReferralCode, StatusCode::BAD_REQUEST)]
    #[case(AppError::SelfReferral, StatusCode::BAD_REQUEST)]
    #[case(AppError::SelfInvite, StatusCode::BAD_REQUEST)]
    #[case(AppError::Unauthorized("Unauthorized".to_string()), StatusCode::UNAUTHORIZED)]
    #[case(AppError::NotFound("User not found".to_string()), StatusCode::NOT_FOUND)]
    #[case(AppError::DuplicateEmail { user_id: None }, StatusCode::CONFLICT)]
    #[case(AppError::DuplicateInvite { invite_id: None }, StatusCode::CONFLICT)]
    #[case(AppError::DuplicateReferral, StatusCode::CONFLICT)]
    #[case(AppError::UniqueViolation("invites_token_key".to_string()), StatusCode::CONFLICT)]
    #[case(
        AppError::Dependency { kind: DependencyKind::Unreachable, detail: "refused".to_string() },
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case(AppError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_errors_to_status_codes(#[case] error: AppError, #[case] expected: StatusCode) {
        assert_eq!(error.to_http_response().status(), expected);
    }

    #[test]
    fn dependency_kinds_have_stable_subcodes() {
        assert_eq!(DependencyKind::SchemaNotInitialized.as_str(), "schema_not_initialized");
        assert_eq!(DependencyKind::Unreachable.as_str(), "unreachable");
        assert_eq!(DependencyKind::Other.as_str(), "error");
    }

    #[test]
    fn domain_messages_are_user_facing() {
        assert!(AppError::SelfInvite.to_string().contains("yourself"));
        assert!(
            AppError::DuplicateInvite { invite_id: None }
                .to_string()
                .contains("already invited")
        );
        assert_eq!(
            AppError::DuplicateEmail { user_id: None }.to_string(),
            "User with this email already exists"
        );
    }
}
