use common::{
    error::{AppError, Res},
    jwt::JwtClaims,
    misc::normalize_email,
};
use db::{Store, models::user::User};
use middleware::extractor::ExtractionMiddleware;

pub mod middleware {
    pub mod extractor;
}

pub fn middleware() -> ExtractionMiddleware {
    ExtractionMiddleware::new()
}

/// Loads the user row behind a validated token. The auth provider owns
/// sessions; the email in the claims is the link to our users table.
pub async fn current_user(store: &dyn Store, claims: &JwtClaims) -> Res<User> {
    store
        .get_user_by_email(&normalize_email(&claims.email))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
