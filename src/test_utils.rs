//! Shared test utilities for `DealPass`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{member, merchant},
    entities,
    entities::{
        deal::{DealStatus, DiscountKind},
        member::MemberRole,
        redemption::VerificationMethod,
    },
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test member with sensible defaults.
///
/// # Arguments
/// * `db` - Database connection
/// * `name` - Member name
///
/// # Defaults
/// * `role`: `MemberRole::Member`
/// * `membership_id`: freshly generated
/// * `is_active`: true
pub async fn create_test_member(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::member::Model> {
    member::create_member(db, name, MemberRole::Member).await
}

/// Creates a test merchant with its own partner member.
///
/// The partner member is named `"<name> Owner"`; use
/// [`crate::core::merchant::create_merchant`] directly when the test needs
/// control over the partner.
pub async fn create_test_merchant(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::merchant::Model> {
    let partner = member::create_member(db, &format!("{name} Owner"), MemberRole::Partner).await?;
    merchant::create_merchant(db, partner.id, name).await
}

/// Per-field arguments for [`insert_deal`], with [`Default`] values matching
/// the common case: an active standard deal worth 10.0 with no validity
/// window and no redemption cap.
#[derive(Debug, Clone, Copy)]
pub struct DealArgs<'a> {
    pub merchant_id: i64,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub kind: DiscountKind,
    pub value: f64,
    pub status: DealStatus,
    pub buy_quantity: Option<i32>,
    pub get_quantity: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub current_redemptions: i32,
    pub max_redemptions: Option<i32>,
}

impl Default for DealArgs<'_> {
    fn default() -> Self {
        Self {
            merchant_id: 0,
            title: "Test Deal",
            description: None,
            kind: DiscountKind::Standard,
            value: 10.0,
            status: DealStatus::Active,
            buy_quantity: None,
            get_quantity: None,
            valid_from: None,
            valid_until: None,
            current_redemptions: 0,
            max_redemptions: None,
        }
    }
}

/// Inserts a deal row directly, bypassing `create_deal` validation and the
/// approval flow. Use this to plant deals in arbitrary states (paused,
/// expired, partially redeemed) that the public API would take several
/// steps to reach.
pub async fn insert_deal(
    db: &DatabaseConnection,
    args: &DealArgs<'_>,
) -> Result<entities::deal::Model> {
    let deal = entities::deal::ActiveModel {
        merchant_id: Set(args.merchant_id),
        title: Set(args.title.to_string()),
        description: Set(args.description.map(ToString::to_string)),
        discount_kind: Set(args.kind),
        discount_value: Set(args.value),
        buy_quantity: Set(args.buy_quantity),
        get_quantity: Set(args.get_quantity),
        valid_from: Set(args.valid_from),
        valid_until: Set(args.valid_until),
        status: Set(args.status),
        current_redemptions: Set(args.current_redemptions),
        max_redemptions: Set(args.max_redemptions),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    deal.insert(db).await.map_err(Into::into)
}

/// Creates an active test deal with sensible defaults.
///
/// # Arguments
/// * `db` - Database connection
/// * `merchant_id` - Owning merchant ID
/// * `title` - Deal title
///
/// # Defaults
/// * `kind`: `DiscountKind::Standard`, `value`: 10.0
/// * `status`: `DealStatus::Active`
/// * no validity window, no redemption cap
pub async fn create_test_deal(
    db: &DatabaseConnection,
    merchant_id: i64,
    title: &str,
) -> Result<entities::deal::Model> {
    insert_deal(
        db,
        &DealArgs {
            merchant_id,
            title,
            ..DealArgs::default()
        },
    )
    .await
}

/// Inserts a ledger row directly with the given timestamp. Redemption
/// history has to be planted this way because `redeem_deal` always stamps
/// the current time.
pub async fn insert_redemption(
    db: &DatabaseConnection,
    member_id: i64,
    deal_id: i64,
    merchant_id: i64,
    savings: f64,
    redeemed_at: DateTime<Utc>,
) -> Result<entities::redemption::Model> {
    let row = entities::redemption::ActiveModel {
        member_id: Set(member_id),
        deal_id: Set(deal_id),
        merchant_id: Set(merchant_id),
        savings: Set(savings),
        original_amount: Set(None),
        redeemed_at: Set(redeemed_at),
        verification_method: Set(VerificationMethod::MerchantCode),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// An in-memory deal model for pure-function tests that never touch the
/// database. Same defaults as [`DealArgs`].
#[must_use]
pub fn sample_deal_model() -> entities::deal::Model {
    entities::deal::Model {
        id: 1,
        merchant_id: 1,
        title: "Test Deal".to_string(),
        description: None,
        discount_kind: DiscountKind::Standard,
        discount_value: 10.0,
        buy_quantity: None,
        get_quantity: None,
        valid_from: None,
        valid_until: None,
        status: DealStatus::Active,
        current_redemptions: 0,
        max_redemptions: None,
        created_at: Utc::now(),
    }
}

/// Sets up a complete test environment with a member, a merchant, and an
/// active deal. Returns (db, member, merchant, deal) for redemption tests.
pub async fn setup_with_deal() -> Result<(
    DatabaseConnection,
    entities::member::Model,
    entities::merchant::Model,
    entities::deal::Model,
)> {
    let db = setup_test_db().await?;
    let member = create_test_member(&db, "Test Member").await?;
    let merchant = create_test_merchant(&db, "Test Merchant").await?;
    let deal = create_test_deal(&db, merchant.id, "Test Deal").await?;
    Ok((db, member, merchant, deal))
}
