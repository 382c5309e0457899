//! Deal entity - Represents a merchant-issued discount offer.
//!
//! Each deal carries a discount descriptor (standard amount, percentage, or
//! buy-N-get-M), an optional validity window, a lifecycle status, and the
//! aggregate redemption counter with its optional cap. The counter is only
//! ever moved by the redemption workflow's conditional increment.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a deal.
///
/// Legal transitions are `pending_approval -> active`, `active <-> paused`,
/// any non-terminal status `-> expired`, and `pending_approval -> rejected`.
/// `expired` and `rejected` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PendingApproval => "pending_approval",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Expired => "expired",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Kind of discount a deal grants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Fixed currency amount off, independent of the bill total
    #[sea_orm(string_value = "standard")]
    Standard,
    /// Percentage of the bill total; requires the original amount at redemption
    #[sea_orm(string_value = "percentage")]
    Percentage,
    /// Buy N get M free; savings are the deal's assigned per-redemption value
    #[sea_orm(string_value = "buy_n_get_m")]
    BuyNGetM,
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Standard => "standard",
            Self::Percentage => "percentage",
            Self::BuyNGetM => "buy_n_get_m",
        };
        f.write_str(s)
    }
}

/// Deal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deals")]
pub struct Model {
    /// Unique identifier for the deal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the merchant that owns this deal
    pub merchant_id: i64,
    /// Customer-facing title (e.g., "2-for-1 Lunch Special")
    pub title: String,
    /// Optional longer description shown on scan
    pub description: Option<String>,
    /// Discount kind: standard, percentage, or buy-N-get-M
    pub discount_kind: DiscountKind,
    /// Percentage points for percentage deals, currency amount otherwise
    pub discount_value: f64,
    /// The N in buy-N-get-M (only set for that kind)
    pub buy_quantity: Option<i32>,
    /// The M in buy-N-get-M (only set for that kind)
    pub get_quantity: Option<i32>,
    /// Start of the validity window; unbounded when None
    pub valid_from: Option<DateTimeUtc>,
    /// End of the validity window; unbounded when None
    pub valid_until: Option<DateTimeUtc>,
    /// Lifecycle status; new deals start as `pending_approval`
    pub status: DealStatus,
    /// Aggregate count of committed redemptions
    pub current_redemptions: i32,
    /// Optional cap; the counter never exceeds this when set
    pub max_redemptions: Option<i32>,
    /// When the deal was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Deal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each deal belongs to one merchant
    #[sea_orm(
        belongs_to = "super::merchant::Entity",
        from = "Column::MerchantId",
        to = "super::merchant::Column::Id"
    )]
    Merchant,
    /// One deal has many ledger entries
    #[sea_orm(has_many = "super::redemption::Entity")]
    Redemptions,
}

impl Related<super::merchant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Merchant.def()
    }
}

impl Related<super::redemption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Redemptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
