//! Unified error types for the redemption core.
//!
//! Every failure the workflow can produce maps 1:1 to a variant here, and
//! every variant carries a stable machine-readable code so callers can branch
//! without parsing display text. Nothing is retried internally; transient
//! persistence failures surface as [`Error::Database`] (code `unavailable`)
//! and retrying is the caller's decision.

use crate::entities::deal::DealStatus;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Deal {id} not found")]
    DealNotFound { id: i64 },

    #[error("Merchant {id} not found")]
    MerchantNotFound { id: i64 },

    #[error("Member {id} not found")]
    MemberNotFound { id: i64 },

    #[error("Deal is not active (status: {status})")]
    DealNotActive { status: DealStatus },

    #[error("Deal {deal_id} is outside its validity window")]
    DealExpired { deal_id: i64 },

    #[error("Invalid redemption proof: {reason}")]
    InvalidProof { reason: &'static str },

    #[error("QR payload is stale ({age_ms} ms old)")]
    StaleProof { age_ms: i64 },

    #[error("Deal already redeemed at {redeemed_at}")]
    AlreadyRedeemed { redeemed_at: DateTime<Utc> },

    #[error("Redemption cap of {cap} reached")]
    RedemptionCapExceeded { cap: i32 },

    #[error("Percentage deals require an original amount")]
    MissingAmount,

    #[error("Malformed QR payload: {message}")]
    MalformedPayload { message: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Illegal deal status transition: {from} -> {to}")]
    InvalidStatusTransition { from: DealStatus, to: DealStatus },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Stable machine-readable code for this error.
    ///
    /// These strings are part of the external contract: clients branch on
    /// them, so existing values must never change. Persistence failures of
    /// any shape collapse to `unavailable` because callers can only react to
    /// them one way (back off and retry).
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DealNotFound { .. } => "deal_not_found",
            Self::MerchantNotFound { .. } => "merchant_not_found",
            Self::MemberNotFound { .. } => "member_not_found",
            Self::DealNotActive { .. } => "deal_not_active",
            Self::DealExpired { .. } => "deal_expired",
            Self::InvalidProof { .. } => "invalid_proof",
            Self::StaleProof { .. } => "stale_proof",
            Self::AlreadyRedeemed { .. } => "already_redeemed",
            Self::RedemptionCapExceeded { .. } => "redemption_cap_exceeded",
            Self::MissingAmount => "missing_amount",
            Self::MalformedPayload { .. } => "malformed_payload",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InvalidStatusTransition { .. } => "invalid_status_transition",
            Self::Config { .. } => "config_error",
            Self::Database(_) => "unavailable",
            Self::Io(_) => "io_error",
            Self::EnvVar(_) => "env_error",
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_error_codes_are_stable() {
        // Clients branch on these codes; lock them down.
        assert_eq!(Error::DealNotFound { id: 1 }.code(), "deal_not_found");
        assert_eq!(
            Error::MerchantNotFound { id: 1 }.code(),
            "merchant_not_found"
        );
        assert_eq!(Error::MemberNotFound { id: 1 }.code(), "member_not_found");
        assert_eq!(
            Error::DealNotActive {
                status: DealStatus::Paused
            }
            .code(),
            "deal_not_active"
        );
        assert_eq!(Error::DealExpired { deal_id: 1 }.code(), "deal_expired");
        assert_eq!(
            Error::InvalidProof {
                reason: "membership mismatch"
            }
            .code(),
            "invalid_proof"
        );
        assert_eq!(Error::StaleProof { age_ms: 301_000 }.code(), "stale_proof");
        assert_eq!(
            Error::AlreadyRedeemed {
                redeemed_at: Utc::now()
            }
            .code(),
            "already_redeemed"
        );
        assert_eq!(
            Error::RedemptionCapExceeded { cap: 2 }.code(),
            "redemption_cap_exceeded"
        );
        assert_eq!(Error::MissingAmount.code(), "missing_amount");
        assert_eq!(
            Error::InvalidAmount { amount: -1.0 }.code(),
            "invalid_amount"
        );
        assert_eq!(
            Error::MalformedPayload {
                message: "not json".to_string()
            }
            .code(),
            "malformed_payload"
        );
        assert_eq!(
            Error::InvalidStatusTransition {
                from: DealStatus::Active,
                to: DealStatus::Rejected
            }
            .code(),
            "invalid_status_transition"
        );
    }

    #[test]
    fn test_database_errors_map_to_unavailable() {
        let err = Error::Database(sea_orm::DbErr::Custom("connection reset".to_string()));
        assert_eq!(err.code(), "unavailable");
    }
}
