//! QR payload codec - encodes and decodes the short-lived payloads embedded
//! in member and deal QR codes.
//!
//! The wire format is a small JSON object tagged by `type` (`MEMBER` or
//! `DEAL`) with camelCase fields and an epoch-millisecond `timestamp`, kept
//! bit-compatible with the mobile clients. Payloads are never persisted;
//! they are constructed, rendered into a QR image by the caller, and
//! verified transiently. Everything here is pure and safe to call from any
//! number of tasks concurrently.

use crate::{
    entities::{deal, member},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum age of a payload before it is rejected as stale (5 minutes).
pub const MAX_PAYLOAD_AGE_MS: i64 = 5 * 60 * 1000;

/// A decoded QR payload.
///
/// `Member` identifies a person by their public membership identifier (the
/// internal `user_id` rides along for lookups but is never trusted alone);
/// `Deal` identifies an offer and the merchant it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QrPayload {
    #[serde(rename = "MEMBER", rename_all = "camelCase")]
    Member {
        user_id: i64,
        membership_id: String,
        /// Issue time in epoch milliseconds
        timestamp: i64,
    },
    #[serde(rename = "DEAL", rename_all = "camelCase")]
    Deal {
        deal_id: i64,
        merchant_id: i64,
        /// Copied from the deal so offline scanners can pre-check expiry
        #[serde(default, skip_serializing_if = "Option::is_none")]
        valid_until: Option<DateTime<Utc>>,
        /// Issue time in epoch milliseconds
        timestamp: i64,
    },
}

impl QrPayload {
    /// Builds a member payload stamped with the current time.
    #[must_use]
    pub fn for_member(member: &member::Model) -> Self {
        Self::Member {
            user_id: member.id,
            membership_id: member.membership_id.clone(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Builds a deal payload stamped with the current time.
    #[must_use]
    pub fn for_deal(deal: &deal::Model) -> Self {
        Self::Deal {
            deal_id: deal.id,
            merchant_id: deal.merchant_id,
            valid_until: deal.valid_until,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Serializes the payload to its compact JSON wire form.
    ///
    /// # Errors
    /// Returns [`Error::MalformedPayload`] if serialization fails (cannot
    /// happen for well-formed payloads; kept as a `Result` so the codec seam
    /// never panics).
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::MalformedPayload {
            message: e.to_string(),
        })
    }

    /// Parses a token back into a payload.
    ///
    /// # Errors
    /// Returns [`Error::MalformedPayload`] when the token is not valid JSON
    /// or does not match one of the two known shapes.
    pub fn decode(token: &str) -> Result<Self> {
        serde_json::from_str(token).map_err(|e| Error::MalformedPayload {
            message: e.to_string(),
        })
    }

    /// Issue time of the payload in epoch milliseconds.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        match self {
            Self::Member { timestamp, .. } | Self::Deal { timestamp, .. } => *timestamp,
        }
    }

    /// Age of the payload relative to `now`, in milliseconds.
    ///
    /// Saturates rather than overflowing when a token carries an extreme
    /// timestamp, so a forged value at the i64 edge reads as maximally stale.
    #[must_use]
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis().saturating_sub(self.timestamp())
    }

    /// Rejects payloads older than [`MAX_PAYLOAD_AGE_MS`].
    ///
    /// # Errors
    /// Returns [`Error::StaleProof`] with the observed age when the payload
    /// has outlived the freshness window.
    pub fn check_freshness(&self, now: DateTime<Utc>) -> Result<()> {
        let age_ms = self.age_ms(now);
        if age_ms > MAX_PAYLOAD_AGE_MS {
            return Err(Error::StaleProof { age_ms });
        }
        Ok(())
    }
}
