// src/common/migrations.rs
//! Database schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Create the schema, optionally dropping it first when RESET_DB=true
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - dropping all tables and recreating schema");
        sqlx::query("DROP TABLE IF EXISTS system_settings")
            .execute(pool)
            .await?;
    }

    create_system_tables(pool).await?;
    init_default_settings(pool).await?;

    info!("Database migration completed");
    Ok(())
}

async fn create_system_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS system_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            encrypted INTEGER DEFAULT 0,
            updated_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed settings from environment variables when no row exists yet, so a
/// fresh deployment is configurable from .env alone. Secrets are read by
/// the settings layer's env fallback instead of being persisted plaintext.
async fn init_default_settings(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let seedable = [
        ("ebay_client_id", "EBAY_CLIENT_ID"),
        ("ebay_redirect_uri", "EBAY_REDIRECT_URI"),
        ("ebay_auth_base_url", "EBAY_AUTH_BASE_URL"),
        ("ebay_api_base_url", "EBAY_API_BASE_URL"),
        ("ebay_site_base_url", "EBAY_SITE_BASE_URL"),
        ("openai_model", "OPENAI_MODEL"),
    ];

    for (key, env_var) in seedable {
        if let Ok(value) = env::var(env_var) {
            sqlx::query(
                r#"
                INSERT INTO system_settings (key, value, encrypted)
                VALUES (?, ?, 0)
                ON CONFLICT(key) DO NOTHING
                "#,
            )
            .bind(key)
            .bind(&value)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}
