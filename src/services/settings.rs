// src/services/settings.rs
//! Key/value settings store backing service configuration and the eBay
//! token slot. Values live in the system_settings table, with a short
//! in-memory cache and an environment-variable fallback for reads.

use crate::services::encryption::{EncryptionError, EncryptionService};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Encryption error: {0}")]
    EncryptionError(#[from] EncryptionError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone)]
struct CachedSetting {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SettingsService {
    db_pool: SqlitePool,
    cache: Arc<RwLock<HashMap<String, CachedSetting>>>,
    encryption_service: Option<EncryptionService>,
    cache_ttl: Duration,
}

impl SettingsService {
    /// Create a new SettingsService, picking up the encryption key from the
    /// environment when one is configured
    pub fn new(db_pool: SqlitePool) -> Self {
        let encryption_service = match EncryptionService::from_env() {
            Ok(service) => {
                info!("Encryption service initialized");
                Some(service)
            }
            Err(e) => {
                warn!(
                    "Encryption service not available: {}. Tokens and secrets will be stored unencrypted.",
                    e
                );
                None
            }
        };

        Self::with_encryption(db_pool, encryption_service)
    }

    /// Create a SettingsService with an explicit encryption service (or none)
    pub fn with_encryption(
        db_pool: SqlitePool,
        encryption_service: Option<EncryptionService>,
    ) -> Self {
        Self {
            db_pool,
            cache: Arc::new(RwLock::new(HashMap::new())),
            encryption_service,
            cache_ttl: Duration::minutes(5),
        }
    }

    /// Get a setting value by key, falling back to the uppercased
    /// environment variable when the database has no row
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, SettingsError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(key) {
                if cached.expires_at > Utc::now() {
                    debug!(key = %key, "Setting retrieved from cache");
                    return Ok(Some(cached.value.clone()));
                }
            }
        }

        let result = sqlx::query_as::<_, (String, String, Option<i64>)>(
            "SELECT key, value, encrypted FROM system_settings WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.db_pool)
        .await?;

        if let Some((_, value, encrypted)) = result {
            let decrypted_value = if encrypted.unwrap_or(0) == 1 {
                match &self.encryption_service {
                    Some(service) => service.decrypt(&value).map_err(|e| {
                        error!(key = %key, error = %e, "Failed to decrypt setting");
                        SettingsError::EncryptionError(e)
                    })?,
                    None => {
                        error!(key = %key, "Setting is encrypted but encryption service not available");
                        return Err(SettingsError::InvalidConfig(
                            "Encryption service not configured".to_string(),
                        ));
                    }
                }
            } else {
                value
            };

            {
                let mut cache = self.cache.write().await;
                cache.insert(
                    key.to_string(),
                    CachedSetting {
                        value: decrypted_value.clone(),
                        expires_at: Utc::now() + self.cache_ttl,
                    },
                );
            }

            Ok(Some(decrypted_value))
        } else {
            if let Ok(env_value) = env::var(key.to_uppercase()) {
                debug!(key = %key, "Setting retrieved from environment variable");
                return Ok(Some(env_value));
            }

            Ok(None)
        }
    }

    /// Get multiple settings at once
    pub async fn get_settings(
        &self,
        keys: &[&str],
    ) -> Result<HashMap<String, Option<String>>, SettingsError> {
        let mut result = HashMap::new();

        for key in keys {
            let value = self.get_setting(key).await?;
            result.insert(key.to_string(), value);
        }

        Ok(result)
    }

    /// Set a setting value, optionally encrypted at rest
    pub async fn set_setting(
        &self,
        key: &str,
        value: &str,
        encrypt: bool,
    ) -> Result<(), SettingsError> {
        let stored_value = if encrypt {
            match &self.encryption_service {
                Some(service) => service.encrypt(value).map_err(|e| {
                    error!(key = %key, error = %e, "Failed to encrypt setting");
                    SettingsError::EncryptionError(e)
                })?,
                None => {
                    return Err(SettingsError::InvalidConfig(
                        "Cannot encrypt setting: encryption service not configured".to_string(),
                    ));
                }
            }
        } else {
            value.to_string()
        };

        sqlx::query(
            r#"
            INSERT INTO system_settings (key, value, encrypted, updated_at)
            VALUES (?, ?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                encrypted = excluded.encrypted,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&stored_value)
        .bind(if encrypt { 1 } else { 0 })
        .execute(&self.db_pool)
        .await?;

        {
            let mut cache = self.cache.write().await;
            cache.remove(key);
        }

        debug!(key = %key, encrypted = encrypt, "Setting updated");
        Ok(())
    }

    /// Delete a setting. Deleting a key that does not exist is a no-op.
    pub async fn delete_setting(&self, key: &str) -> Result<(), SettingsError> {
        sqlx::query("DELETE FROM system_settings WHERE key = ?")
            .bind(key)
            .execute(&self.db_pool)
            .await?;

        {
            let mut cache = self.cache.write().await;
            cache.remove(key);
        }

        debug!(key = %key, "Setting deleted");
        Ok(())
    }

    /// Check if encryption is available
    pub fn is_encryption_available(&self) -> bool {
        self.encryption_service.is_some()
    }
}
