//! Member entity - A platform account that can redeem deals.
//!
//! The `membership_id` is the public identifier embedded in QR payloads so
//! internal primary keys never leave the system on their own; it is a UUIDv4
//! assigned at creation and unique platform-wide.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role attached to an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    #[sea_orm(string_value = "member")]
    Member,
    #[sea_orm(string_value = "partner")]
    Partner,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Member => "member",
            Self::Partner => "partner",
            Self::Admin => "admin",
        };
        f.write_str(s)
    }
}

/// Member database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Unique identifier for the member
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Public membership identifier carried in QR payloads (UUIDv4)
    #[sea_orm(unique)]
    pub membership_id: String,
    /// Account role
    pub role: MemberRole,
    /// Soft-deactivation flag - inactive members cannot scan or redeem
    pub is_active: bool,
}

/// Defines relationships between Member and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One member has many ledger entries
    #[sea_orm(has_many = "super::redemption::Entity")]
    Redemptions,
}

impl Related<super::redemption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Redemptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
