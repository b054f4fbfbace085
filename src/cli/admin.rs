use anyhow::Context;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::Role;
use crate::database::DatabaseManager;
use crate::services::accounts::{create_account, NewAccount};

pub struct CreateAdminArgs {
    pub username: String,
    pub password: String,
    pub email: String,
    pub name: String,
    pub department: Option<String>,
}

pub async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("connecting to DATABASE_URL")?;
    DatabaseManager::migrate(&pool).await?;
    println!("Migrations applied");
    Ok(())
}

pub async fn create_admin(config: &AppConfig, args: CreateAdminArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL must be set; the in-memory store does not outlive this command");
    }
    let store = DatabaseManager::open_store(&config.database).await?;

    let account = create_account(
        store.as_ref(),
        NewAccount {
            username: args.username,
            email: args.email,
            password: args.password,
            name: args.name,
            department: args.department,
            badge_number: None,
            role: Role::Admin,
        },
    )
    .await?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&account)?),
        OutputFormat::Text => println!("Created admin '{}' ({})", account.username, account.id),
    }
    Ok(())
}
