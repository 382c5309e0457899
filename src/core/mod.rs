/// Deal lifecycle, lookups, and the redemption counter
pub mod deal;

/// Member identity and lifecycle
pub mod member;

/// Merchant records and verification codes
pub mod merchant;

/// The redemption workflow and ledger queries
pub mod redemption;

/// QR issuance and scanning
pub mod scan;
