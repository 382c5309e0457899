//! Seed data loading from config.toml
//!
//! This module provides functionality to load initial members, merchants,
//! and deals from a TOML configuration file. The entries defined in
//! config.toml are used to seed the database on first run or when rows are
//! missing; existing rows are left untouched so the seeder can run on every
//! startup.

use crate::core::{deal, member, merchant};
use crate::entities::{
    Deal, DealColumn, Member, MemberColumn, Merchant, MerchantColumn,
    deal::DiscountKind, member::MemberRole,
};
use crate::errors::{Error, Result};
use chrono::{TimeDelta, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct SeedConfig {
    /// Member accounts to seed
    #[serde(default)]
    pub members: Vec<MemberSeed>,
    /// Merchant profiles to seed
    #[serde(default)]
    pub merchants: Vec<MerchantSeed>,
    /// Deals to seed
    #[serde(default)]
    pub deals: Vec<DealSeed>,
}

/// Configuration for a single member account
#[derive(Debug, Deserialize, Clone)]
pub struct MemberSeed {
    /// Display name of the member
    pub name: String,
    /// Account role; defaults to a regular member
    pub role: Option<MemberRole>,
}

/// Configuration for a single merchant profile
#[derive(Debug, Deserialize, Clone)]
pub struct MerchantSeed {
    /// Display name of the business
    pub name: String,
    /// Name of the partner member account that owns this profile
    pub partner: String,
}

/// Configuration for a single deal
#[derive(Debug, Deserialize, Clone)]
pub struct DealSeed {
    /// Name of the merchant that offers the deal
    pub merchant: String,
    /// Customer-facing title
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Discount kind (`standard`, `percentage`, or `buy_n_get_m`)
    pub kind: DiscountKind,
    /// Percentage points or currency amount depending on the kind
    pub value: f64,
    /// The N in buy-N-get-M
    pub buy_quantity: Option<i32>,
    /// The M in buy-N-get-M
    pub get_quantity: Option<i32>,
    /// Validity window length in days, starting when the seeder runs
    pub valid_days: Option<i64>,
    /// Optional redemption cap
    pub max_redemptions: Option<i32>,
    /// Whether to approve the deal immediately after creation
    #[serde(default)]
    pub active: bool,
}

/// Counts of what a seeding run actually did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub members_created: usize,
    pub merchants_created: usize,
    pub deals_created: usize,
    pub skipped: usize,
}

/// Loads seed configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Returns
/// * `Ok(SeedConfig)` - Successfully parsed configuration
/// * `Err(Error)` - Failed to read or parse the configuration file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads seed configuration from the default location (./config.toml)
///
/// # Returns
/// * `Ok(SeedConfig)` - Successfully parsed configuration
/// * `Err(Error)` - Failed to read or parse the configuration file
pub fn load_default_config() -> Result<SeedConfig> {
    load_config("config.toml")
}

/// Seeds members, merchants, and deals from the configuration.
///
/// Runs in a single transaction. Rows that already exist (matched by name,
/// or by merchant plus title for deals) are skipped with a warning, so the
/// seeder is safe to run on every startup. Merchant and deal entries that
/// reference a missing owner are skipped rather than failing the whole run.
///
/// # Errors
/// Returns an error if the transaction cannot be completed or a new row
/// fails validation.
pub async fn seed_initial_data(
    db: &DatabaseConnection,
    config: &SeedConfig,
) -> Result<SeedSummary> {
    info!(
        members = config.members.len(),
        merchants = config.merchants.len(),
        deals = config.deals.len(),
        "Seeding initial data from config"
    );
    let txn = db.begin().await?;
    let mut summary = SeedSummary::default();

    for member_seed in &config.members {
        let existing = Member::find()
            .filter(MemberColumn::Name.eq(member_seed.name.as_str()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            warn!(name = %member_seed.name, "Member already exists. Skipping.");
            summary.skipped += 1;
            continue;
        }
        let role = member_seed.role.unwrap_or(MemberRole::Member);
        member::create_member(&txn, &member_seed.name, role).await?;
        summary.members_created += 1;
    }

    for merchant_seed in &config.merchants {
        let existing = Merchant::find()
            .filter(MerchantColumn::Name.eq(merchant_seed.name.as_str()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            warn!(name = %merchant_seed.name, "Merchant already exists. Skipping.");
            summary.skipped += 1;
            continue;
        }
        let Some(partner) = Member::find()
            .filter(MemberColumn::Name.eq(merchant_seed.partner.as_str()))
            .one(&txn)
            .await?
        else {
            warn!(
                name = %merchant_seed.name,
                partner = %merchant_seed.partner,
                "Partner account not found for merchant. Skipping."
            );
            summary.skipped += 1;
            continue;
        };
        merchant::create_merchant(&txn, partner.id, &merchant_seed.name).await?;
        summary.merchants_created += 1;
    }

    for deal_seed in &config.deals {
        let Some(owner) = Merchant::find()
            .filter(MerchantColumn::Name.eq(deal_seed.merchant.as_str()))
            .one(&txn)
            .await?
        else {
            warn!(
                title = %deal_seed.title,
                merchant = %deal_seed.merchant,
                "Merchant not found for deal. Skipping."
            );
            summary.skipped += 1;
            continue;
        };
        let existing = Deal::find()
            .filter(DealColumn::MerchantId.eq(owner.id))
            .filter(DealColumn::Title.eq(deal_seed.title.as_str()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            warn!(title = %deal_seed.title, "Deal already exists. Skipping.");
            summary.skipped += 1;
            continue;
        }

        let now = Utc::now();
        let (valid_from, valid_until) = match deal_seed.valid_days {
            Some(days) => (Some(now), Some(now + TimeDelta::days(days))),
            None => (None, None),
        };
        let created = deal::create_deal(
            &txn,
            &deal::NewDeal {
                merchant_id: owner.id,
                title: &deal_seed.title,
                description: deal_seed.description.as_deref(),
                kind: deal_seed.kind,
                value: deal_seed.value,
                buy_quantity: deal_seed.buy_quantity,
                get_quantity: deal_seed.get_quantity,
                valid_from,
                valid_until,
                max_redemptions: deal_seed.max_redemptions,
            },
        )
        .await?;
        if deal_seed.active {
            deal::approve_deal(&txn, created.id).await?;
        }
        summary.deals_created += 1;
    }

    txn.commit().await?;
    info!(
        members = summary.members_created,
        merchants = summary.merchants_created,
        deals = summary.deals_created,
        skipped = summary.skipped,
        "Finished seeding initial data"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::deal::DealStatus;
    use crate::test_utils::setup_test_db;

    fn sample_config() -> SeedConfig {
        let toml_str = r#"
            [[members]]
            name = "Ada"

            [[members]]
            name = "Bistro Nine"
            role = "partner"

            [[merchants]]
            name = "Bistro Nine"
            partner = "Bistro Nine"

            [[deals]]
            merchant = "Bistro Nine"
            title = "Lunch for Two"
            kind = "percentage"
            value = 25.0
            valid_days = 30
            max_redemptions = 100
            active = true

            [[deals]]
            merchant = "Bistro Nine"
            title = "Free Dessert"
            kind = "standard"
            value = 6.5
        "#;
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_parse_seed_config() {
        let config = sample_config();
        assert_eq!(config.members.len(), 2);
        assert_eq!(config.members[0].name, "Ada");
        assert_eq!(config.members[0].role, None);
        assert_eq!(config.members[1].role, Some(MemberRole::Partner));

        assert_eq!(config.merchants.len(), 1);
        assert_eq!(config.merchants[0].partner, "Bistro Nine");

        assert_eq!(config.deals.len(), 2);
        assert_eq!(config.deals[0].kind, DiscountKind::Percentage);
        assert_eq!(config.deals[0].value, 25.0);
        assert_eq!(config.deals[0].max_redemptions, Some(100));
        assert!(config.deals[0].active);
        assert_eq!(config.deals[1].kind, DiscountKind::Standard);
        assert!(!config.deals[1].active);
    }

    #[tokio::test]
    async fn test_seed_creates_everything_once() -> Result<()> {
        let db = setup_test_db().await?;
        let config = sample_config();

        let summary = seed_initial_data(&db, &config).await?;
        assert_eq!(summary.members_created, 2);
        assert_eq!(summary.merchants_created, 1);
        assert_eq!(summary.deals_created, 2);
        assert_eq!(summary.skipped, 0);

        let merchants = Merchant::find().all(&db).await?;
        assert_eq!(merchants.len(), 1);
        assert_eq!(merchants[0].merchant_code.len(), 6);

        let deals = Deal::find().all(&db).await?;
        assert_eq!(deals.len(), 2);
        let lunch = deals.iter().find(|d| d.title == "Lunch for Two").unwrap();
        assert_eq!(lunch.status, DealStatus::Active);
        assert!(lunch.valid_until.is_some());
        let dessert = deals.iter().find(|d| d.title == "Free Dessert").unwrap();
        assert_eq!(dessert.status, DealStatus::PendingApproval);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config = sample_config();

        seed_initial_data(&db, &config).await?;
        let second = seed_initial_data(&db, &config).await?;

        assert_eq!(second.members_created, 0);
        assert_eq!(second.merchants_created, 0);
        assert_eq!(second.deals_created, 0);
        assert_eq!(second.skipped, 5);

        assert_eq!(Member::find().all(&db).await?.len(), 2);
        assert_eq!(Merchant::find().all(&db).await?.len(), 1);
        assert_eq!(Deal::find().all(&db).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_skips_merchant_with_unknown_partner() -> Result<()> {
        let db = setup_test_db().await?;
        let config: SeedConfig = toml::from_str(
            r#"
            [[merchants]]
            name = "Orphan Cafe"
            partner = "Nobody"
        "#,
        )
        .unwrap();

        let summary = seed_initial_data(&db, &config).await?;
        assert_eq!(summary.merchants_created, 0);
        assert_eq!(summary.skipped, 1);
        assert!(Merchant::find().all(&db).await?.is_empty());
        Ok(())
    }
}
