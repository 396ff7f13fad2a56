use crate::cli::{utils::output_success, OutputFormat};
use crate::config;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let database = super::connect(config::config()).await?;
    let result = database.migrate().await;
    database.close().await;
    result?;

    output_success(output_format, "Migrations applied", None)
}
