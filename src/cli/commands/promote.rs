use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::cli::{utils::output_success, OutputFormat};
use crate::config;
use crate::database::PgUserRepository;
use crate::services::UserService;

pub async fn handle(username: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let database = super::connect(config).await?;

    let tokens = Arc::new(TokenIssuer::from_config(&config.security)?);
    let users = UserService::new(
        Arc::new(PgUserRepository::new(database.pool().clone())),
        tokens,
        config.security.bcrypt_cost,
    );

    let result = users.promote(username).await;
    database.close().await;
    let user = result?;

    output_success(
        output_format,
        &format!("{} is now an admin", user.username),
        Some(serde_json::to_value(&user)?),
    )
}
