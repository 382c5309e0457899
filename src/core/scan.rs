//! QR issuance and scanning.
//!
//! Issuance stamps a fresh payload for a member badge or a deal poster.
//! Scanning is audience-checked: a merchant device scans member badges, a
//! member device scans deal posters, and every other combination is
//! rejected. Scan results are previews for display; the authoritative
//! checks happen again at redemption time.

use crate::{
    errors::{Error, Result},
    qr::QrPayload,
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::*;

/// Which side of the counter is holding the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerRole {
    Member,
    Merchant,
}

/// What a successful scan resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// A member badge, scanned at the counter
    Member {
        member_id: i64,
        name: String,
        membership_id: String,
    },
    /// A deal poster, scanned by a browsing member
    Deal {
        deal_id: i64,
        title: String,
        description: Option<String>,
        /// Human-readable discount, rendered by `format_discount`
        discount: String,
        merchant_name: String,
        valid_until: Option<DateTime<Utc>>,
    },
}

/// Issues a badge payload for an active member.
///
/// # Errors
/// `Error::MemberNotFound` when the member is missing or deactivated.
pub async fn issue_member_qr(db: &DatabaseConnection, member_id: i64) -> Result<QrPayload> {
    let member = crate::core::member::get_member_by_id(db, member_id)
        .await?
        .ok_or(Error::MemberNotFound { id: member_id })?;
    Ok(QrPayload::for_member(&member))
}

/// Issues a poster payload for a deal.
///
/// # Errors
/// `Error::DealNotFound` when the deal or its merchant is missing.
pub async fn issue_deal_qr(db: &DatabaseConnection, deal_id: i64) -> Result<QrPayload> {
    let (deal, _merchant) = crate::core::deal::get_deal_with_merchant(db, deal_id)
        .await?
        .ok_or(Error::DealNotFound { id: deal_id })?;
    Ok(QrPayload::for_deal(&deal))
}

/// Decodes and resolves a scanned token for the given scanner audience.
///
/// Decode and freshness failures surface as `MalformedPayload` and
/// `StaleProof`. A token whose referent no longer exists, no longer
/// matches, or was issued for the other audience fails `InvalidProof`; a
/// poster advertising a window that has closed fails `DealExpired`.
pub async fn scan_qr(
    db: &DatabaseConnection,
    token: &str,
    scanner: ScannerRole,
) -> Result<ScanOutcome> {
    let payload = QrPayload::decode(token)?;
    payload.check_freshness(Utc::now())?;

    match (payload, scanner) {
        (
            QrPayload::Member {
                user_id,
                membership_id,
                ..
            },
            ScannerRole::Merchant,
        ) => scan_member_badge(db, user_id, &membership_id).await,
        (
            QrPayload::Deal {
                deal_id,
                merchant_id,
                valid_until,
                ..
            },
            ScannerRole::Member,
        ) => scan_deal_poster(db, deal_id, merchant_id, valid_until).await,
        _ => Err(Error::InvalidProof {
            reason: "payload not meant for this scanner",
        }),
    }
}

async fn scan_member_badge(
    db: &DatabaseConnection,
    user_id: i64,
    membership_id: &str,
) -> Result<ScanOutcome> {
    let member = crate::core::member::get_member_by_membership_id(db, membership_id)
        .await?
        .ok_or(Error::InvalidProof {
            reason: "unknown membership",
        })?;
    if member.id != user_id {
        return Err(Error::InvalidProof {
            reason: "membership mismatch",
        });
    }
    Ok(ScanOutcome::Member {
        member_id: member.id,
        name: member.name,
        membership_id: member.membership_id,
    })
}

async fn scan_deal_poster(
    db: &DatabaseConnection,
    deal_id: i64,
    merchant_id: i64,
    embedded_valid_until: Option<DateTime<Utc>>,
) -> Result<ScanOutcome> {
    // The poster itself may advertise a window that has since closed
    if let Some(until) = embedded_valid_until {
        if Utc::now() > until {
            return Err(Error::DealExpired { deal_id });
        }
    }

    let (deal, merchant) = crate::core::deal::get_deal_with_merchant(db, deal_id)
        .await?
        .ok_or(Error::InvalidProof {
            reason: "unknown deal",
        })?;
    if merchant.id != merchant_id {
        return Err(Error::InvalidProof {
            reason: "payload references another merchant",
        });
    }

    let discount = crate::core::deal::format_discount(&deal);
    Ok(ScanOutcome::Deal {
        deal_id: deal.id,
        title: deal.title,
        description: deal.description,
        discount,
        merchant_name: merchant.name,
        valid_until: deal.valid_until,
    })
}
