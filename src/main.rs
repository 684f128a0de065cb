use airline_booking_engine::app::build_rocket;
use airline_booking_engine::config::AppConfig;
use airline_booking_engine::db::Database;
use airline_booking_engine::store::{MySqlStore, SharedStore};
use airline_booking_engine::utils::time::{SharedClock, SystemClock};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    // Connect to the database and make sure the tables exist
    let database = Database::new(&config.database).await?;
    database.migrate().await?;

    info!(
        atomicity = ?config.rules.atomicity,
        home_base = %config.rules.crew_home_base,
        "Starting booking engine"
    );

    let store: SharedStore = Arc::new(MySqlStore::new(database.get_pool().clone()));
    let clock: SharedClock = Arc::new(SystemClock);

    let _ = build_rocket(store, config.rules, clock).launch().await?;
    Ok(())
}
