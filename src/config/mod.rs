/// Database configuration and connection management
pub mod database;

/// Seed data loading from config.toml
pub mod seed;

/// Redemption policy settings from environment variables
pub mod settings;
