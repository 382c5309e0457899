//! Merchant entity - Represents a physical business that honors deals.
//!
//! The `merchant_code` is the platform-wide-unique shared secret a member
//! types in (or the merchant reads out) to prove physical presence when no
//! QR scan is possible.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Merchant database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "merchants")]
pub struct Model {
    /// Unique identifier for the merchant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account ID of the partner that owns this merchant profile
    pub partner_id: i64,
    /// Display name of the business
    pub name: String,
    /// Verification code proving physical-presence redemption; unique platform-wide
    #[sea_orm(unique)]
    pub merchant_code: String,
    /// When the merchant profile was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Merchant and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One merchant has many deals
    #[sea_orm(has_many = "super::deal::Entity")]
    Deals,
    /// One merchant has many ledger entries
    #[sea_orm(has_many = "super::redemption::Entity")]
    Redemptions,
}

impl Related<super::deal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deals.def()
    }
}

impl Related<super::redemption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Redemptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
