//! Database migration command.

use gatehouse_core::config::{AppConfig, DatabaseDriver};
use gatehouse_core::error::AppError;
use gatehouse_database::connection::DatabasePool;
use gatehouse_database::migration::run_migrations;

use crate::output;

/// Apply all pending migrations to the configured PostgreSQL database.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    if config.database.driver != DatabaseDriver::Postgres {
        return Err(AppError::validation(
            "Migrations only apply to the postgres driver",
        ));
    }

    let pool = DatabasePool::connect(&config.database).await?;
    println!("Running database migrations...");
    run_migrations(pool.pool()).await?;
    pool.close().await;

    output::print_success("All migrations applied.");
    Ok(())
}
