use std::sync::Arc;

use actix_web::{Responder, get, web};
use api_invites::services::invite::list_invites;
use common::{env_config::Config, error::Res, http::Success, jwt::JwtClaims};
use db::Store;

use crate::{
    dtos::dashboard::{DashboardResponse, DashboardUser},
    services::{metrics, referral},
};

/// Everything the dashboard page shows for the authenticated user: their
/// referral link, sent invites, credited referrals and conversion metrics.
#[get("")]
pub async fn get_dashboard(
    claims: web::ReqData<JwtClaims>,
    store: web::Data<Arc<dyn Store>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let store: &dyn Store = store.get_ref().as_ref();
    let user = extractor::current_user(store, &claims).await?;

    let invites = list_invites(store, user.id).await?;
    let referrals = referral::list_for_inviter(store, user.id).await?;
    let metrics = metrics::compute_metrics(store, user.id).await?;

    Success::ok(DashboardResponse {
        referral_url: config.referral_url(&user.referral_code),
        user: DashboardUser::from(&user),
        invites,
        referrals,
        metrics,
    })
}
