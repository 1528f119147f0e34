use build_buddy::{
    config::{catalog, database},
    core::seed::seed_catalog,
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Make sure the default SQLite directory exists
    let database_url = database::get_database_url();
    if database_url.starts_with("sqlite://data/") {
        std::fs::create_dir_all("data")?;
    }

    // 4. Connect and create tables
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed the catalog
    let config = catalog::load_default_config()
        .inspect_err(|e| error!("Failed to load catalog seed: {e}"))?;
    let summary = seed_catalog(&db, &config)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {e}"))?;
    info!(
        users = summary.users,
        categories = summary.categories,
        components = summary.components,
        "Catalog ready."
    );

    Ok(())
}
