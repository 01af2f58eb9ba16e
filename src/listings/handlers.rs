// src/listings/handlers.rs
//! Listing generation and publishing endpoints. Both accept multipart form
//! data because the UI sends raw photo bytes straight from the picker.

use axum::{
    extract::{Extension, Multipart},
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::common::{ApiError, AppState};

use super::models::{GeneratedListing, ImageAsset, PublishResult};
use super::validators::validate_images;

/// POST /api/listings/generate - Produce listing content from seller photos
///
/// Multipart fields: repeated `images` files, optional `personal_note` text,
/// optional `high_quality` flag ("true"/"false").
pub async fn generate_listing(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    mut multipart: Multipart,
) -> Result<Json<GeneratedListing>, ApiError> {
    let state = state_lock.read().await.clone();

    let mut images: Vec<ImageAsset> = Vec::new();
    let mut personal_note = String::new();
    let mut high_quality = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart data: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "images" => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;
                images.push(ImageAsset { data, mime_type });
            }
            "personal_note" => {
                personal_note = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid personal note: {}", e)))?;
            }
            "high_quality" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Invalid high_quality flag: {}", e))
                })?;
                high_quality = value == "true";
            }
            other => {
                warn!(field = other, "Ignoring unexpected multipart field");
            }
        }
    }

    validate_images(&images).map_err(ApiError::InvalidInput)?;

    info!(
        image_count = images.len(),
        high_quality, "Generating listing from photos"
    );

    let listing = state
        .openai_service
        .generate_listing(&images, &personal_note, high_quality)
        .await?;

    Ok(Json(listing))
}

/// POST /api/listings/publish - Publish a generated listing to eBay
///
/// Multipart fields: `listing` JSON text + repeated `images` files. Always
/// answers with a terminal PublishResult; only malformed requests surface as
/// HTTP errors.
pub async fn publish_listing(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    mut multipart: Multipart,
) -> Result<Json<PublishResult>, ApiError> {
    let state = state_lock.read().await.clone();

    let mut listing: Option<GeneratedListing> = None;
    let mut images: Vec<ImageAsset> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart data: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "listing" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read listing: {}", e)))?;
                let parsed: GeneratedListing = serde_json::from_str(&raw)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid listing JSON: {}", e)))?;
                listing = Some(parsed);
            }
            "images" => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;
                images.push(ImageAsset { data, mime_type });
            }
            other => {
                warn!(field = other, "Ignoring unexpected multipart field");
            }
        }
    }

    let listing =
        listing.ok_or_else(|| ApiError::BadRequest("Missing listing field".to_string()))?;

    info!(
        title = %listing.title,
        image_count = images.len(),
        "Publishing listing"
    );

    match state.publisher_service.publish(&listing, &images).await {
        Ok(item) => {
            info!(listing_id = %item.listing_id, "Listing is live");
            Ok(Json(PublishResult::published(item.item_url)))
        }
        Err(e) => {
            error!(error = %e, "Publish failed");
            Ok(Json(PublishResult::failed(e.to_string())))
        }
    }
}
