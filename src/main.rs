use dotenvy::dotenv;
use storefront::config::{database, store};
use storefront::core::category;
use storefront::errors::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load store settings
    let config = store::load_default_config()
        .inspect_err(|e| error!("Critical error loading store configuration: {}", e))?;
    if config.promptpay_id.is_none() {
        info!("PROMPTPAY_ID is not set; payment QR codes will be unavailable.");
    }

    // 4. Connect and create tables
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Connected to database."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database tables are ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed categories from config.toml
    category::seed_categories(&db, &config.categories)
        .await
        .inspect(|created| info!("Seeded {created} new categories."))
        .inspect_err(|e| error!("Failed to seed categories: {}", e))?;

    info!(
        "Storefront ready: shipping fee {} baht, cache TTL {}h.",
        config.shipping_fee, config.cache_ttl_hours
    );
    Ok(())
}
