use std::collections::HashSet;

use common::error::Res;
use db::Store;
use serde::Serialize;
use uuid::Uuid;

/// Conversion statistics for one inviter. Rates are percentages rounded to
/// one decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_invites: usize,
    pub accepted_invites: usize,
    pub total_signups: usize,
    pub conversion_rate: f64,
    pub referral_conversion_rate: f64,
}

/// Derives the inviter's metrics from both ledgers.
///
/// An invite counts as accepted when its status is ACCEPTED or a referral
/// points at it; the two sources overlap, so they are merged as a set of
/// invite ids.
pub async fn compute_metrics(store: &dyn Store, inviter_id: Uuid) -> Res<Metrics> {
    let invites = store.get_invites_by_inviter(inviter_id).await?;
    let referrals = store.get_referrals_by_inviter(inviter_id).await?;

    let accepted: HashSet<Uuid> = invites
        .iter()
        .filter(|invite| invite.is_accepted())
        .map(|invite| invite.id)
        .chain(referrals.iter().filter_map(|referral| referral.invite_id))
        .collect();

    let total_invites = invites.len();
    let accepted_invites = accepted.len();
    let total_signups = referrals.len();

    Ok(Metrics {
        total_invites,
        accepted_invites,
        total_signups,
        conversion_rate: rate(accepted_invites, total_invites),
        referral_conversion_rate: rate(total_signups, total_invites),
    })
}

/// `numerator / denominator` as a percentage with one decimal, 0 for no denominator.
pub fn rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let percent = numerator as f64 / denominator as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}
