//! Member business logic - Handles member accounts and their lookups.
//!
//! Members are the accounts that scan and redeem deals. Each account gets a
//! UUIDv4 membership identifier at creation; it is the only member
//! identifier that ever appears inside QR payloads. Lookups exclude
//! deactivated accounts so a disabled member can neither scan nor redeem.
//! All functions are async and return Result types for error handling.

use crate::{
    entities::{
        Member,
        member::{self, MemberRole},
    },
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use uuid::Uuid;

/// Creates a new member account with a freshly assigned membership identifier.
///
/// This function validates that the name is not empty, trims whitespace, and
/// generates a UUIDv4 `membership_id`. New accounts start active. Generic
/// over the connection so the seeder can call it inside a transaction.
pub async fn create_member<C>(db: &C, name: &str, role: MemberRole) -> Result<member::Model>
where
    C: ConnectionTrait,
{
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Member name cannot be empty".to_string(),
        });
    }

    let member = member::ActiveModel {
        name: Set(name.trim().to_string()),
        membership_id: Set(Uuid::new_v4().to_string()),
        role: Set(role),
        is_active: Set(true),
        ..Default::default()
    };

    let result = member.insert(db).await?;
    Ok(result)
}

/// Finds an active member by primary key, returning None if missing or deactivated.
///
/// Deactivated accounts are treated the same as absent ones so that every
/// caller gets the same answer to "can this member act right now".
pub async fn get_member_by_id<C>(db: &C, member_id: i64) -> Result<Option<member::Model>>
where
    C: ConnectionTrait,
{
    Member::find_by_id(member_id)
        .filter(member::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active member by their public membership identifier.
///
/// This is the lookup behind merchant-side QR scans, where only the
/// membership UUID from the payload is known.
pub async fn get_member_by_membership_id<C>(
    db: &C,
    membership_id: &str,
) -> Result<Option<member::Model>>
where
    C: ConnectionTrait,
{
    Member::find()
        .filter(member::Column::MembershipId.eq(membership_id))
        .filter(member::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deactivates a member account without deleting its history.
///
/// Ledger rows keep referencing the account; the member simply stops being
/// able to scan or redeem. Deactivating twice is a no-op.
pub async fn deactivate_member(db: &DatabaseConnection, member_id: i64) -> Result<member::Model> {
    let member = Member::find_by_id(member_id)
        .one(db)
        .await?
        .ok_or(Error::MemberNotFound { id: member_id })?;

    let mut active: member::ActiveModel = member.into();
    active.is_active = Set(false);
    active.update(db).await.map_err(Into::into)
}
