use dealpass::{
    config::{database, seed, settings::RepeatPolicy},
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the seed configuration
    let seed_config = seed::load_default_config()
        .inspect_err(|e| error!("Failed to load seed configuration: {}", e))?;

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create database tables: {}", e))?;

    // 5. Resolve the redemption repeat policy
    let policy = RepeatPolicy::from_env()
        .inspect_err(|e| error!("Invalid redemption policy configuration: {}", e))?;
    info!(?policy, "Redemption repeat policy loaded.");

    // 6. Seed initial members, merchants, and deals (if necessary)
    let summary = seed::seed_initial_data(&db, &seed_config)
        .await
        .inspect_err(|e| error!("Failed to seed initial data: {}", e))?;
    info!(
        members = summary.members_created,
        merchants = summary.merchants_created,
        deals = summary.deals_created,
        skipped = summary.skipped,
        "Seed data processed."
    );

    Ok(())
}
