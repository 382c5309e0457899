//! Redemption workflow - The one place deals get consumed.
//!
//! `redeem_deal` validates a member's proof of physical presence, derives the
//! savings server-side, and writes the append-only ledger row. The duplicate
//! check, ledger insert, and counter increment all run inside a single
//! database transaction, so a failure at any point (including a redemption
//! cap reached by a concurrent redeemer) leaves no partial state behind.
//! Savings are always computed here from the deal's discount descriptor;
//! nothing the caller sends is trusted beyond the bill total, which is only
//! an input to the percentage math.

use crate::{
    config::settings::RepeatPolicy,
    entities::{
        Deal, Merchant, Redemption,
        deal::{self, DealStatus, DiscountKind},
        member, merchant,
        redemption::{self, VerificationMethod},
    },
    errors::{Error, Result},
    qr::QrPayload,
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Proof of physical presence presented at redemption.
///
/// Exactly one of the two supported verification paths; there is no
/// fall-through between them.
#[derive(Debug, Clone, PartialEq)]
pub enum RedemptionProof {
    /// A scanned QR payload, either the member's badge or the deal's poster
    QrCode(QrPayload),
    /// The merchant's verification code, typed in at the counter
    MerchantCode(String),
}

/// A request to redeem a deal on behalf of an authenticated member.
#[derive(Debug, Clone)]
pub struct RedeemRequest {
    /// The redeeming member (from the caller's session, not the proof)
    pub member_id: i64,
    /// The deal being consumed
    pub deal_id: i64,
    /// Proof of physical presence
    pub proof: RedemptionProof,
    /// Bill total; required for percentage discounts, recorded otherwise
    pub original_amount: Option<f64>,
}

/// A committed redemption plus the display fields receipts need.
#[derive(Debug, Clone)]
pub struct RedemptionOutcome {
    /// The ledger row that was written
    pub redemption: redemption::Model,
    /// Savings granted, same value as on the ledger row
    pub savings: f64,
    pub deal_title: String,
    pub merchant_name: String,
    pub member_name: String,
}

/// Rounds a currency value to whole cents.
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derives the savings a redemption grants.
///
/// Percentage deals take `discount_value` percent of the bill total, rounded
/// to cents, and fail [`Error::MissingAmount`] without one. Standard and
/// buy-N-get-M deals grant the deal's fixed value regardless of the bill.
/// The amount itself is validated by the workflow before this runs.
pub fn compute_savings(deal: &deal::Model, original_amount: Option<f64>) -> Result<f64> {
    match deal.discount_kind {
        DiscountKind::Percentage => {
            let amount = original_amount.ok_or(Error::MissingAmount)?;
            Ok(round_to_cents(deal.discount_value / 100.0 * amount))
        }
        DiscountKind::Standard | DiscountKind::BuyNGetM => Ok(deal.discount_value),
    }
}

/// Fails [`Error::DealExpired`] when `now` falls outside the deal's validity
/// window. Each bound is checked only when present.
fn check_validity_window(deal: &deal::Model, now: DateTime<Utc>) -> Result<()> {
    if let Some(from) = deal.valid_from {
        if now < from {
            return Err(Error::DealExpired { deal_id: deal.id });
        }
    }
    if let Some(until) = deal.valid_until {
        if now > until {
            return Err(Error::DealExpired { deal_id: deal.id });
        }
    }
    Ok(())
}

/// Validates the presented proof against the loaded deal, merchant, and
/// member, returning which verification method to record.
///
/// QR payloads must be fresh. A member badge must identify the requesting
/// member by both identifiers; a deal poster must reference exactly this
/// deal and its merchant; a typed code must match the merchant's current
/// verification code.
fn verify_proof(
    proof: &RedemptionProof,
    deal: &deal::Model,
    merchant: &merchant::Model,
    member: &member::Model,
    now: DateTime<Utc>,
) -> Result<VerificationMethod> {
    match proof {
        RedemptionProof::QrCode(payload) => {
            payload.check_freshness(now)?;
            match payload {
                QrPayload::Member {
                    user_id,
                    membership_id,
                    ..
                } => {
                    if *user_id != member.id || membership_id != &member.membership_id {
                        return Err(Error::InvalidProof {
                            reason: "membership mismatch",
                        });
                    }
                }
                QrPayload::Deal {
                    deal_id,
                    merchant_id,
                    ..
                } => {
                    if *deal_id != deal.id || *merchant_id != merchant.id {
                        return Err(Error::InvalidProof {
                            reason: "payload references another deal",
                        });
                    }
                }
            }
            Ok(VerificationMethod::QrCode)
        }
        RedemptionProof::MerchantCode(code) => {
            if code != &merchant.merchant_code {
                return Err(Error::InvalidProof {
                    reason: "merchant code mismatch",
                });
            }
            Ok(VerificationMethod::MerchantCode)
        }
    }
}

/// Redeems a deal for a member, writing the ledger row and moving the
/// deal's counter.
///
/// All checks and writes run inside one transaction, in a fixed order:
/// lookups, bill-amount validation, deal status, validity window, proof,
/// repeat-policy duplicate check, then the insert and the cap-guarded
/// counter increment. Any failure rolls the whole transaction back; in
/// particular a [`Error::RedemptionCapExceeded`] from the increment erases
/// the just-inserted ledger row, so the counter and the ledger can never
/// disagree.
///
/// # Errors
/// One variant per rejected check; see [`Error`]. Nothing is retried
/// internally.
pub async fn redeem_deal(
    db: &DatabaseConnection,
    request: &RedeemRequest,
    policy: &RepeatPolicy,
) -> Result<RedemptionOutcome> {
    let now = Utc::now();
    let txn = db.begin().await?;

    let deal = Deal::find_by_id(request.deal_id)
        .one(&txn)
        .await?
        .ok_or(Error::DealNotFound {
            id: request.deal_id,
        })?;

    let merchant =
        Merchant::find_by_id(deal.merchant_id)
            .one(&txn)
            .await?
            .ok_or(Error::MerchantNotFound {
                id: deal.merchant_id,
            })?;

    let member = crate::core::member::get_member_by_id(&txn, request.member_id)
        .await?
        .ok_or(Error::MemberNotFound {
            id: request.member_id,
        })?;

    if let Some(amount) = request.original_amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }

    if deal.status != DealStatus::Active {
        return Err(Error::DealNotActive {
            status: deal.status,
        });
    }

    check_validity_window(&deal, now)?;

    let verification_method = verify_proof(&request.proof, &deal, &merchant, &member, now)?;

    if let Some(previous) =
        find_recent_redemption(&txn, member.id, deal.id, policy.window_start(now)).await?
    {
        return Err(Error::AlreadyRedeemed {
            redeemed_at: previous.redeemed_at,
        });
    }

    let savings = compute_savings(&deal, request.original_amount)?;

    let row = redemption::ActiveModel {
        member_id: Set(member.id),
        deal_id: Set(deal.id),
        merchant_id: Set(merchant.id),
        savings: Set(savings),
        original_amount: Set(request.original_amount),
        redeemed_at: Set(now),
        verification_method: Set(verification_method),
        ..Default::default()
    };
    let committed = row.insert(&txn).await?;

    // A cap failure here rolls the ledger row back with the transaction
    crate::core::deal::increment_redemption_count(&txn, deal.id).await?;

    txn.commit().await?;

    info!(
        member_id = member.id,
        deal_id = deal.id,
        merchant_id = merchant.id,
        savings,
        method = %committed.verification_method,
        "Redemption committed"
    );

    Ok(RedemptionOutcome {
        redemption: committed,
        savings,
        deal_title: deal.title,
        merchant_name: merchant.name,
        member_name: member.name,
    })
}

/// Finds the most recent redemption of a deal by a member at or after
/// `since`; `None` for `since` means the whole ledger counts.
///
/// This is the repeat-policy primitive: a cooldown passes its window start,
/// once-per-member passes `None`.
pub async fn find_recent_redemption<C>(
    db: &C,
    member_id: i64,
    deal_id: i64,
    since: Option<DateTime<Utc>>,
) -> Result<Option<redemption::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Redemption::find()
        .filter(redemption::Column::MemberId.eq(member_id))
        .filter(redemption::Column::DealId.eq(deal_id));
    if let Some(since) = since {
        query = query.filter(redemption::Column::RedeemedAt.gte(since));
    }
    query
        .order_by_desc(redemption::Column::RedeemedAt)
        .one(db)
        .await
        .map_err(Into::into)
}

/// A member's redemption history, newest first.
pub async fn get_redemptions_for_member(
    db: &DatabaseConnection,
    member_id: i64,
) -> Result<Vec<redemption::Model>> {
    Redemption::find()
        .filter(redemption::Column::MemberId.eq(member_id))
        .order_by_desc(redemption::Column::RedeemedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A deal's full redemption ledger, newest first.
pub async fn get_redemptions_for_deal(
    db: &DatabaseConnection,
    deal_id: i64,
) -> Result<Vec<redemption::Model>> {
    Redemption::find()
        .filter(redemption::Column::DealId.eq(deal_id))
        .order_by_desc(redemption::Column::RedeemedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Total savings a deal has granted across its whole ledger.
pub async fn total_savings_for_deal(db: &DatabaseConnection, deal_id: i64) -> Result<f64> {
    let rows = get_redemptions_for_deal(db, deal_id).await?;
    Ok(rows.iter().map(|r| r.savings).sum())
}
