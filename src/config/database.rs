//! Database configuration module for `DealPass`.
//!
//! Connection handling plus table creation for the `SQLite` backing store.
//! The schema is generated straight from the entity definitions with
//! `SeaORM`'s `Schema::create_table_from_entity`, so there is no hand-written
//! SQL to drift out of sync with the models.

use crate::entities::{Deal, Member, Merchant, Redemption};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Resolves the database URL from `DATABASE_URL`, defaulting to a local
/// `SQLite` file.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/dealpass.sqlite".to_string())
}

/// Opens a connection to the configured database.
///
/// # Errors
/// Returns `Error::Database` when the backing store cannot be reached.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates every table the crate needs, derived from the entity models.
///
/// Tables are created in dependency order (merchants and members before
/// deals, deals before redemptions) so foreign keys always resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let merchant_table = schema.create_table_from_entity(Merchant);
    let member_table = schema.create_table_from_entity(Member);
    let deal_table = schema.create_table_from_entity(Deal);
    let redemption_table = schema.create_table_from_entity(Redemption);

    db.execute(builder.build(&merchant_table)).await?;
    db.execute(builder.build(&member_table)).await?;
    db.execute(builder.build(&deal_table)).await?;
    db.execute(builder.build(&redemption_table)).await?;

    Ok(())
}
