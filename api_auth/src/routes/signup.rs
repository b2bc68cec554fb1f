use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{error::Res, http::Success};
use db::Store;

use crate::{
    dtos::signup::{SignupRequest, SignupResponse, SignupUser},
    services::user::{self, Registration},
};

/// Registers a new user, optionally through a referral code.
///
/// # Input
/// - `req`: JSON body `{ "email", "password", "ref"? }`
///
/// # Output
/// - 201 with the new user's id, email and referral code, plus the id of the
///   referral it was credited to (`null` without one)
/// - 400 for invalid input, an unknown referral code or a self-referral
/// - 409 with `userId` when the email is already registered
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/signup', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({
///     email: 'friend@example.com',
///     password: 'secret123',
///     ref: new URLSearchParams(window.location.search).get('ref'),
///   }),
/// });
/// ```
#[post("")]
pub async fn post_signup(
    store: web::Data<Arc<dyn Store>>,
    req: web::Json<SignupRequest>,
) -> Res<impl Responder> {
    let store: &dyn Store = store.get_ref().as_ref();
    let Registration { user, referral_id } = user::register_user(
        store,
        req.email.as_deref(),
        req.password.as_deref(),
        req.referral_code.as_deref(),
    )
    .await?;

    Success::created(SignupResponse {
        success: true,
        user: SignupUser {
            id: user.id,
            email: user.email,
            referral_code: user.referral_code,
        },
        referral_id,
    })
}
