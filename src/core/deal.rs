//! Deal business logic - Handles deal lifecycle, lookups, and the redemption counter.
//!
//! Deals move through a small state machine: they are born `pending_approval`,
//! an admin approves or rejects them, merchants may pause and resume approved
//! deals, and any non-terminal deal can be expired. The aggregate redemption
//! counter on each deal is only ever moved here, by a single conditional SQL
//! update that enforces the optional cap in the database itself.
//! All functions are async and return Result types for error handling.

use crate::{
    entities::{
        Deal, Merchant,
        deal::{self, DealStatus, DiscountKind},
        merchant,
    },
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};

/// Parameters for creating a deal.
///
/// Grouping them keeps `create_deal` readable and lets callers use struct
/// update syntax for the optional fields.
#[derive(Debug, Clone, Copy)]
pub struct NewDeal<'a> {
    /// Merchant that offers the deal
    pub merchant_id: i64,
    /// Customer-facing title
    pub title: &'a str,
    /// Optional longer description
    pub description: Option<&'a str>,
    /// Discount kind
    pub kind: DiscountKind,
    /// Percentage points or currency amount depending on the kind
    pub value: f64,
    /// The N in buy-N-get-M (that kind only)
    pub buy_quantity: Option<i32>,
    /// The M in buy-N-get-M (that kind only)
    pub get_quantity: Option<i32>,
    /// Start of the validity window
    pub valid_from: Option<DateTimeUtc>,
    /// End of the validity window
    pub valid_until: Option<DateTimeUtc>,
    /// Optional redemption cap
    pub max_redemptions: Option<i32>,
}

/// Whether the lifecycle state machine permits `from -> to`.
///
/// `expired` and `rejected` are terminal; everything not listed here is
/// illegal, including self-transitions.
const fn transition_allowed(from: DealStatus, to: DealStatus) -> bool {
    matches!(
        (from, to),
        (
            DealStatus::PendingApproval,
            DealStatus::Active | DealStatus::Rejected | DealStatus::Expired
        ) | (DealStatus::Active, DealStatus::Paused | DealStatus::Expired)
            | (DealStatus::Paused, DealStatus::Active | DealStatus::Expired)
    )
}

/// Creates a new deal in `pending_approval` with a zeroed redemption counter.
///
/// This function validates the discount descriptor (finite non-negative
/// value, percentage at most 100, quantities present exactly for
/// buy-N-get-M), the validity window ordering, and the cap, then verifies
/// the owning merchant exists. Generic over the connection so the seeder can
/// call it inside a transaction.
pub async fn create_deal<C>(db: &C, new: &NewDeal<'_>) -> Result<deal::Model>
where
    C: ConnectionTrait,
{
    if new.title.trim().is_empty() {
        return Err(Error::Config {
            message: "Deal title cannot be empty".to_string(),
        });
    }

    if !new.value.is_finite() || new.value < 0.0 {
        return Err(Error::InvalidAmount { amount: new.value });
    }

    if matches!(new.kind, DiscountKind::Percentage) && new.value > 100.0 {
        return Err(Error::InvalidAmount { amount: new.value });
    }

    match new.kind {
        DiscountKind::BuyNGetM => {
            let (Some(buy), Some(get)) = (new.buy_quantity, new.get_quantity) else {
                return Err(Error::Config {
                    message: "Buy-N-get-M deals require both quantities".to_string(),
                });
            };
            if buy < 1 || get < 1 {
                return Err(Error::Config {
                    message: "Buy-N-get-M quantities must be at least 1".to_string(),
                });
            }
        }
        DiscountKind::Standard | DiscountKind::Percentage => {
            if new.buy_quantity.is_some() || new.get_quantity.is_some() {
                return Err(Error::Config {
                    message: "Quantities are only valid for buy-N-get-M deals".to_string(),
                });
            }
        }
    }

    if let (Some(from), Some(until)) = (new.valid_from, new.valid_until) {
        if from > until {
            return Err(Error::Config {
                message: "Deal validity window starts after it ends".to_string(),
            });
        }
    }

    if let Some(cap) = new.max_redemptions {
        if cap < 1 {
            return Err(Error::Config {
                message: "Redemption cap must be at least 1".to_string(),
            });
        }
    }

    Merchant::find_by_id(new.merchant_id)
        .one(db)
        .await?
        .ok_or(Error::MerchantNotFound {
            id: new.merchant_id,
        })?;

    let deal = deal::ActiveModel {
        merchant_id: Set(new.merchant_id),
        title: Set(new.title.trim().to_string()),
        description: Set(new.description.map(str::to_string)),
        discount_kind: Set(new.kind),
        discount_value: Set(new.value),
        buy_quantity: Set(new.buy_quantity),
        get_quantity: Set(new.get_quantity),
        valid_from: Set(new.valid_from),
        valid_until: Set(new.valid_until),
        status: Set(DealStatus::PendingApproval),
        current_redemptions: Set(0),
        max_redemptions: Set(new.max_redemptions),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = deal.insert(db).await?;
    Ok(result)
}

/// Finds a deal by primary key.
pub async fn get_deal_by_id<C>(db: &C, deal_id: i64) -> Result<Option<deal::Model>>
where
    C: ConnectionTrait,
{
    Deal::find_by_id(deal_id).one(db).await.map_err(Into::into)
}

/// Finds a deal together with its owning merchant in one query.
pub async fn get_deal_with_merchant(
    db: &DatabaseConnection,
    deal_id: i64,
) -> Result<Option<(deal::Model, merchant::Model)>> {
    let found = Deal::find_by_id(deal_id)
        .find_also_related(Merchant)
        .one(db)
        .await?;
    Ok(found.and_then(|(deal, owner)| owner.map(|m| (deal, m))))
}

/// Lists a merchant's active deals, ordered alphabetically by title.
///
/// This is what member-facing browse surfaces show; paused, pending, and
/// terminal deals never appear here.
pub async fn get_active_deals_for_merchant(
    db: &DatabaseConnection,
    merchant_id: i64,
) -> Result<Vec<deal::Model>> {
    Deal::find()
        .filter(deal::Column::MerchantId.eq(merchant_id))
        .filter(deal::Column::Status.eq(DealStatus::Active))
        .order_by_asc(deal::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves a deal to a new lifecycle status, enforcing the transition rules.
///
/// Anything the state machine does not permit fails
/// [`Error::InvalidStatusTransition`] without touching the row.
pub async fn set_deal_status<C>(
    db: &C,
    deal_id: i64,
    new_status: DealStatus,
) -> Result<deal::Model>
where
    C: ConnectionTrait,
{
    let deal = Deal::find_by_id(deal_id)
        .one(db)
        .await?
        .ok_or(Error::DealNotFound { id: deal_id })?;

    if !transition_allowed(deal.status, new_status) {
        return Err(Error::InvalidStatusTransition {
            from: deal.status,
            to: new_status,
        });
    }

    let mut active: deal::ActiveModel = deal.into();
    active.status = Set(new_status);
    active.update(db).await.map_err(Into::into)
}

/// Approves a pending deal, making it redeemable.
pub async fn approve_deal<C>(db: &C, deal_id: i64) -> Result<deal::Model>
where
    C: ConnectionTrait,
{
    set_deal_status(db, deal_id, DealStatus::Active).await
}

/// Rejects a pending deal. Terminal.
pub async fn reject_deal<C>(db: &C, deal_id: i64) -> Result<deal::Model>
where
    C: ConnectionTrait,
{
    set_deal_status(db, deal_id, DealStatus::Rejected).await
}

/// Pauses an active deal or resumes a paused one.
///
/// The merchant-facing on/off switch. Deals in any other status cannot be
/// toggled.
pub async fn toggle_deal_status(db: &DatabaseConnection, deal_id: i64) -> Result<deal::Model> {
    let deal = Deal::find_by_id(deal_id)
        .one(db)
        .await?
        .ok_or(Error::DealNotFound { id: deal_id })?;

    let target = match deal.status {
        DealStatus::Active => DealStatus::Paused,
        DealStatus::Paused => DealStatus::Active,
        other => {
            return Err(Error::InvalidStatusTransition {
                from: other,
                to: DealStatus::Paused,
            });
        }
    };

    set_deal_status(db, deal_id, target).await
}

/// Renders a deal's discount for customer-facing display.
///
/// Percentage deals render as `"25%"`, fixed amounts as the bare value
/// (`"10"`, `"6.5"`), and buy-N-get-M deals as `"Buy 2 Get 1"`.
#[must_use]
pub fn format_discount(deal: &deal::Model) -> String {
    match deal.discount_kind {
        DiscountKind::Percentage => format!("{}%", deal.discount_value),
        DiscountKind::BuyNGetM => match (deal.buy_quantity, deal.get_quantity) {
            (Some(buy), Some(get)) => format!("Buy {buy} Get {get}"),
            // Quantities are validated at creation; keep a sane fallback anyway
            _ => deal.discount_value.to_string(),
        },
        DiscountKind::Standard => deal.discount_value.to_string(),
    }
}

/// Atomically increments a deal's redemption counter, honoring the cap.
///
/// This runs a single conditional update:
/// `SET current_redemptions = current_redemptions + 1 WHERE id = ? AND
/// (max_redemptions IS NULL OR current_redemptions < max_redemptions)`.
/// Concurrent redeemers therefore can never push the counter past the cap,
/// no matter how they interleave. When the guard matches nothing, a
/// follow-up read distinguishes a missing deal from an exhausted cap.
///
/// # Returns
/// The deal with its updated counter.
pub async fn increment_redemption_count<C>(db: &C, deal_id: i64) -> Result<deal::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let result = Deal::update_many()
        .col_expr(
            deal::Column::CurrentRedemptions,
            Expr::col(deal::Column::CurrentRedemptions).add(1),
        )
        .filter(deal::Column::Id.eq(deal_id))
        .filter(
            Condition::any()
                .add(deal::Column::MaxRedemptions.is_null())
                .add(
                    Expr::col(deal::Column::CurrentRedemptions)
                        .lt(Expr::col(deal::Column::MaxRedemptions)),
                ),
        )
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let deal = Deal::find_by_id(deal_id)
            .one(db)
            .await?
            .ok_or(Error::DealNotFound { id: deal_id })?;
        // The guard can only fail a present row when the cap is set and reached
        let cap = deal.max_redemptions.unwrap_or(deal.current_redemptions);
        return Err(Error::RedemptionCapExceeded { cap });
    }

    Deal::find_by_id(deal_id)
        .one(db)
        .await?
        .ok_or(Error::DealNotFound { id: deal_id })
}
