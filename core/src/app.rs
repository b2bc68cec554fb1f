use actix_web::{error::JsonPayloadError, web};
use common::error::AppError;

/// Mounts every route under `/api`. Invite and dashboard scopes require a
/// bearer token; the extractor middleware must wrap the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .service(crate::health::get_health)
            .service(api_auth::mount_signup())
            .service(api_invites::mount_invites().wrap(api_auth::auth_middleware()))
            .service(api_referrals::mount_dashboard().wrap(api_auth::auth_middleware())),
    );
}

/// Unreadable bodies answer with the usual JSON error shape. The parser
/// detail only goes to the debug log.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, req| {
        log::debug!("Rejected body for {} {}: {}", req.method(), req.path(), err);
        let message = match err {
            JsonPayloadError::ContentType => "Content-Type must be application/json",
            _ => "Request body must be valid JSON",
        };
        AppError::BadRequest(message.to_string()).into()
    })
}
