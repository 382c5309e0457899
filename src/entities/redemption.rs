//! Redemption entity - The append-only ledger of consumed deals.
//!
//! Each row records who redeemed what, where, the derived savings, and how
//! the redemption was verified. Rows are written exactly once by the
//! redemption workflow and never mutated or deleted afterwards; repeat
//! protection is enforced by the workflow's transaction, not a DB index,
//! because the rolling lookback window cannot be expressed as one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a redemption was verified at the point of sale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// A fresh signed QR payload was scanned
    #[sea_orm(string_value = "qr_code")]
    QrCode,
    /// The merchant's static verification code was entered
    #[sea_orm(string_value = "merchant_code")]
    MerchantCode,
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::QrCode => "qr_code",
            Self::MerchantCode => "merchant_code",
        };
        f.write_str(s)
    }
}

/// Redemption database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "redemptions")]
pub struct Model {
    /// Unique identifier for the ledger entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Member who redeemed
    pub member_id: i64,
    /// Deal that was redeemed
    pub deal_id: i64,
    /// Merchant that honored the deal
    pub merchant_id: i64,
    /// Savings granted; derived by the workflow, never caller-supplied
    pub savings: f64,
    /// Bill total the member reported, when the discount needed one
    pub original_amount: Option<f64>,
    /// When the redemption was committed
    pub redeemed_at: DateTimeUtc,
    /// How the redemption was verified
    pub verification_method: VerificationMethod,
}

/// Defines relationships between Redemption and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ledger entry belongs to one member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
    /// Each ledger entry belongs to one deal
    #[sea_orm(
        belongs_to = "super::deal::Entity",
        from = "Column::DealId",
        to = "super::deal::Column::Id"
    )]
    Deal,
    /// Each ledger entry belongs to one merchant
    #[sea_orm(
        belongs_to = "super::merchant::Entity",
        from = "Column::MerchantId",
        to = "super::merchant::Column::Id"
    )]
    Merchant,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::deal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deal.def()
    }
}

impl Related<super::merchant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Merchant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
