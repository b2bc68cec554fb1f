use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{env_config::Config, error::Res, http::Success, jwt::JwtClaims, misc::parse_email};
use db::Store;

use crate::{
    dtos::invite::{CreateInviteRequest, CreateInviteResponse},
    services::{self, email::InviteEmail},
};

/// Sends an invite from the authenticated user.
///
/// # Input
/// - `claims`: identity from the bearer token
/// - `req`: JSON body `{ "email": "friend@example.com" }`
///
/// # Output
/// - 201 with the invite and its shareable URL
/// - 400 for a missing or malformed email, or a self-invite
/// - 404 when the token's identity has no account
/// - 409 with `inviteId` when this email was already invited
///
/// Email delivery is best-effort: a failure is logged and the invite stands.
#[post("")]
pub async fn post_invite(
    claims: web::ReqData<JwtClaims>,
    store: web::Data<Arc<dyn Store>>,
    config: web::Data<Arc<Config>>,
    req: web::Json<CreateInviteRequest>,
) -> Res<impl Responder> {
    let store: &dyn Store = store.get_ref().as_ref();
    let email = parse_email(req.email.as_deref())?;

    let inviter = extractor::current_user(store, &claims).await?;
    let invite = services::invite::create_invite(store, inviter.id, &email).await?;
    let invite_url = config.invite_url(&inviter.referral_code, &invite.token);

    let message = InviteEmail {
        to: invite.email.clone(),
        inviter_name: inviter.display_name().to_string(),
        invite_url: invite_url.clone(),
    };
    if let Err(err) = services::email::send_invite_email(&config.email, &message).await {
        log::error!("Failed to send invite email for invite {}: {}", invite.id, err);
    }

    Success::created(CreateInviteResponse {
        success: true,
        invite: invite.into(),
        invite_url,
    })
}
