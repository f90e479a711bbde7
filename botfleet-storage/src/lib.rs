mod migration;
mod sql;

use botfleet_error::{storage::StorageError, FleetError, FleetResult};
use botfleet_models::settings::Settings;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use sql::sqlite;
use tracing::{info, instrument};

/// Database bootstrap and teardown.
///
/// `init` opens the pool, runs migrations and hands the connection to the
/// caller, which owns it for the process lifetime. Nothing here keeps a
/// copy; teardown works on a borrow.
pub struct FleetDb;

impl FleetDb {
    #[instrument(name = "init-db", skip_all)]
    pub async fn init(settings: &Settings) -> FleetResult<DatabaseConnection> {
        let db = sqlite::init_db(&settings.db.sqlite)
            .await
            .map_err(|e| FleetError::Init(format!("Failed to init SQLite database: {e}")))?;

        Migrator::up(&db, None)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;

        info!("Database initialized successfully");
        Ok(db)
    }

    #[instrument(name = "db_close", skip_all)]
    pub async fn close(db: &DatabaseConnection) -> FleetResult<()> {
        info!("🛑 Closing database connections...");
        db.close_by_ref().await?;
        info!("✅ Database connections closed successfully");
        Ok(())
    }
}
