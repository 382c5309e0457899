//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod deal;
pub mod member;
pub mod merchant;
pub mod redemption;

// Re-export specific types to avoid conflicts
pub use deal::{Column as DealColumn, Entity as Deal, Model as DealModel};
pub use member::{Column as MemberColumn, Entity as Member, Model as MemberModel};
pub use merchant::{Column as MerchantColumn, Entity as Merchant, Model as MerchantModel};
pub use redemption::{Column as RedemptionColumn, Entity as Redemption, Model as RedemptionModel};
