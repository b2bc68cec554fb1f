use common::error::{AppError, Res};
use db::{
    Store,
    dtos::referral::ReferralCreateRequest,
    error::{constraints, is_violation_of},
    models::referral::{Referral, ReferralListItem},
};
use uuid::Uuid;

/// Links `signup_user_id` to the user who referred them.
///
/// A signup user can be referred only once. When `invite_id` is given it
/// must be an invite sent by the same inviter.
pub async fn create_referral(
    store: &dyn Store,
    inviter_id: Uuid,
    signup_user_id: Uuid,
    invite_id: Option<Uuid>,
) -> Res<Referral> {
    if store
        .get_referral_by_signup_user(signup_user_id)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateReferral);
    }

    if let Some(invite_id) = invite_id {
        let invite = store
            .get_invite_by_id(invite_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invite does not exist".to_string()))?;
        if invite.inviter_id != inviter_id {
            return Err(AppError::BadRequest(
                "Invite belongs to a different inviter".to_string(),
            ));
        }
    }

    let referral = store
        .insert_referral(ReferralCreateRequest {
            inviter_id,
            signup_user_id,
            invite_id,
        })
        .await
        .map_err(|err| {
            if is_violation_of(&err, constraints::REFERRALS_SIGNUP_USER) {
                AppError::DuplicateReferral
            } else {
                err
            }
        })?;

    log::info!(
        "Referral {} recorded: {} -> {}",
        referral.id,
        inviter_id,
        signup_user_id
    );
    Ok(referral)
}

/// Referrals credited to `inviter_id`, newest first.
pub async fn list_for_inviter(store: &dyn Store, inviter_id: Uuid) -> Res<Vec<ReferralListItem>> {
    store.get_referral_list_by_inviter(inviter_id).await
}
