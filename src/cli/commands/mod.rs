pub mod migrate;
pub mod promote;
pub mod serve;

use anyhow::Context;

use crate::config::AppConfig;
use crate::database::Database;

/// Opens the pool described by `config.database`
pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<Database> {
    Database::connect(&config.database)
        .await
        .context("failed to connect to PostgreSQL (is DATABASE_URL set?)")
}
