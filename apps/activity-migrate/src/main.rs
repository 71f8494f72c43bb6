use std::sync::Arc;

use tracing::{error, info};

use activity_core::services::ActivityService;
use activity_infrastructure::{create_pool, run_migrations, PgStaffDirectory, PgUnitOfWork};
use activity_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry; the guard flushes the file writer on exit
    let _log_guard = activity_shared::telemetry::init_telemetry(&config.log)?;

    info!("{} migrations starting (env: {})", config.app.name, config.app.env);

    // Connect to Database
    let pool = create_pool(&config.database).await?;
    info!("Database connection established.");

    if let Err(e) = run_migrations(&pool).await {
        error!("Migration failed: {}", e);
        return Err(e.into());
    }

    // Smoke check through the engine against the migrated schema
    let service = ActivityService::new(
        Arc::new(PgUnitOfWork::new(pool.clone())),
        Arc::new(PgStaffDirectory::new(pool.clone())),
    )
    .with_capacity_enforcement(config.activity.enforce_capacity);

    let categories = service.list_categories().await?;
    info!("Schema ready: {} activity categories present", categories.len());

    pool.close().await;
    Ok(())
}
