// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::{EbayService, OpenAIService, PublisherService, SettingsService};

/// Application state containing the database pool and services
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub settings_service: Arc<SettingsService>,
    pub ebay_service: Arc<EbayService>,
    pub openai_service: Arc<OpenAIService>,
    pub publisher_service: Arc<PublisherService>,
}
