//! Create user command handler

use crate::config::Config;
use crate::db::{Store, StoreError};

pub async fn cmd_create_user(
    config: &Config,
    username: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<()> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        println!("Usage: bloqueos create-user <username> <password> [--admin]");
        return Ok(());
    }

    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    match store
        .create_user_with_password(username, password, is_admin, &config.security)
        .await
    {
        Ok(user) => {
            let role = if user.is_admin { "admin" } else { "user" };
            println!("✓ Created {} '{}' (ID: {})", role, user.username, user.id);
            Ok(())
        }
        Err(e) if matches!(e.downcast_ref::<StoreError>(), Some(StoreError::UniqueViolation(_))) => {
            println!("User '{}' already exists", username);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
