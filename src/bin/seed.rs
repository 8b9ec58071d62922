use tracing_subscriber::EnvFilter;

use daytrip::config::AppConfig;
use daytrip::db;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    let conn = db::init_db(&config.database_url)?;

    db::seed::run(&conn)?;
    tracing::info!(database = %config.database_url, "database seeded");

    Ok(())
}
