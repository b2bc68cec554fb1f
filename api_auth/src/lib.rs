use actix_web::web;
use middleware::auth::AuthMiddleware;

pub mod middleware {
    pub mod auth;
}
pub mod routes {
    pub mod signup;
}
pub mod services {
    pub mod credentials;
    pub mod user;
}
mod dtos {
    pub(crate) mod signup;
}

pub fn mount_signup() -> actix_web::Scope {
    web::scope("/signup").service(routes::signup::post_signup)
}

/// Rejects requests without valid bearer claims. Needs the extractor
/// middleware to run first.
pub fn auth_middleware() -> AuthMiddleware {
    AuthMiddleware::new()
}
