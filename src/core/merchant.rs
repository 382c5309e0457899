//! Merchant business logic - Handles merchant profiles and verification codes.
//!
//! Every merchant carries a short verification code that a member can type in
//! at the counter when a QR scan is impossible. The code is the only shared
//! secret in the physical-presence flow, so it is unique platform-wide and
//! can be rotated without touching anything else on the profile.
//! All functions are async and return Result types for error handling.

use crate::{
    entities::{Merchant, merchant},
    errors::{Error, Result},
};
use rand::Rng;
use sea_orm::{Set, prelude::*};

/// Length of a merchant verification code.
pub const MERCHANT_CODE_LENGTH: usize = 6;

/// Characters a merchant verification code is drawn from.
pub const MERCHANT_CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// 36^6 codes make collisions vanishingly rare; the retry cap only guards
// against a broken RNG looping forever.
const MAX_CODE_ATTEMPTS: usize = 8;

/// Generates a random verification code (6 uppercase alphanumeric characters).
fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..MERCHANT_CODE_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..MERCHANT_CODE_ALPHABET.len());
            MERCHANT_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Returns a freshly generated code that no existing merchant uses.
async fn unused_code<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_code();
        let taken = Merchant::find()
            .filter(merchant::Column::MerchantCode.eq(code.as_str()))
            .one(db)
            .await?;
        if taken.is_none() {
            return Ok(code);
        }
    }
    Err(Error::Config {
        message: "Could not generate a unique merchant code".to_string(),
    })
}

/// Creates a new merchant profile with a unique verification code.
///
/// This function validates that the name is not empty and trims whitespace.
/// Generic over the connection so the seeder can call it inside a
/// transaction.
pub async fn create_merchant<C>(db: &C, partner_id: i64, name: &str) -> Result<merchant::Model>
where
    C: ConnectionTrait,
{
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Merchant name cannot be empty".to_string(),
        });
    }

    let code = unused_code(db).await?;
    let merchant = merchant::ActiveModel {
        partner_id: Set(partner_id),
        name: Set(name.trim().to_string()),
        merchant_code: Set(code),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = merchant.insert(db).await?;
    Ok(result)
}

/// Finds a merchant by primary key.
pub async fn get_merchant_by_id<C>(db: &C, merchant_id: i64) -> Result<Option<merchant::Model>>
where
    C: ConnectionTrait,
{
    Merchant::find_by_id(merchant_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a merchant by its verification code.
///
/// Used by scanner apps to resolve which counter a typed-in code belongs to.
pub async fn get_merchant_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<merchant::Model>> {
    Merchant::find()
        .filter(merchant::Column::MerchantCode.eq(code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Rotates a merchant's verification code, keeping platform-wide uniqueness.
///
/// Existing ledger rows are unaffected; only future code-based redemptions
/// must use the new value. Used when a code has leaked beyond the counter.
pub async fn regenerate_merchant_code(
    db: &DatabaseConnection,
    merchant_id: i64,
) -> Result<merchant::Model> {
    let merchant = Merchant::find_by_id(merchant_id)
        .one(db)
        .await?
        .ok_or(Error::MerchantNotFound { id: merchant_id })?;

    let code = unused_code(db).await?;
    let mut active: merchant::ActiveModel = merchant.into();
    active.merchant_code = Set(code);
    active.update(db).await.map_err(Into::into)
}
