// src/services/publisher.rs
//! Listing publication pipeline: media upload -> inventory item -> offer ->
//! publish. Steps run in order because each consumes an identifier produced
//! by the one before it. Every step reuses the current access token; a 401
//! triggers at most one silent refresh-and-retry per publish call.

use crate::listings::models::{GeneratedListing, ImageAsset};
use crate::listings::validators::{validate_generated_listing, validate_images};
use crate::services::ebay::{EbayConfig, EbayError, EbayService};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("No eBay account connected")]
    NotConnected,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Media upload failed: {0}")]
    MediaUploadFailed(String),

    #[error("Listing rejected by marketplace: {0}")]
    ListingRejected(String),

    #[error("Marketplace request failed: {0}")]
    RequestFailed(String),
}

impl From<EbayError> for PublishError {
    fn from(e: EbayError) -> Self {
        match e {
            // A dead refresh token already cleared the store; the account
            // must be reconnected before publishing again
            EbayError::NotConnected | EbayError::RefreshFailed(_) => PublishError::NotConnected,
            other => PublishError::RequestFailed(other.to_string()),
        }
    }
}

/// Per-step failure, tagged so the orchestrator can map it to the
/// step-appropriate publish error
#[derive(Debug)]
enum StepError {
    /// Access token rejected by the marketplace
    Unauthorized,
    /// Token refresh after a 401 also failed
    AuthLost,
    /// Non-401 error status with the marketplace's detail message
    Status(StatusCode, String),
    /// Connection/timeout level failure
    Transport(String),
    /// Response body did not have the expected shape
    Malformed(String),
}

/// Outcome of a fully published listing
#[derive(Debug, Clone)]
pub struct PublishedItem {
    pub listing_id: String,
    pub item_url: String,
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    #[serde(rename = "imageUrl")]
    image_url: String,
}

#[derive(Debug, Deserialize)]
struct OfferResponse {
    #[serde(rename = "offerId")]
    offer_id: String,
}

#[derive(Debug, Deserialize)]
struct PublishOfferResponse {
    #[serde(rename = "listingId")]
    listing_id: String,
}

#[derive(Debug, Clone)]
pub struct PublisherService {
    ebay_service: Arc<EbayService>,
    client: Client,
}

impl PublisherService {
    pub fn new(ebay_service: Arc<EbayService>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            ebay_service,
            client,
        }
    }

    /// Publish a generated listing with its images to the connected eBay
    /// account. Terminal: exactly one live listing on full success, a typed
    /// failure otherwise. Input and connection preconditions are checked
    /// before any network round trip is spent.
    pub async fn publish(
        &self,
        listing: &GeneratedListing,
        images: &[ImageAsset],
    ) -> Result<PublishedItem, PublishError> {
        validate_images(images).map_err(PublishError::InvalidInput)?;
        validate_generated_listing(listing).map_err(PublishError::InvalidInput)?;

        if !self.ebay_service.is_connected().await {
            return Err(PublishError::NotConnected);
        }

        let config = self.ebay_service.get_config().await?;
        let mut token = self.ebay_service.valid_access_token().await?;
        let mut refreshed = false;

        // The step closures borrow rather than consume, so each can run a
        // second time after a token refresh
        let cfg = &config;

        // Step 1: media upload. Earlier uploads from a failed attempt are
        // left to the marketplace's own garbage collection.
        let mut image_urls = Vec::with_capacity(images.len());
        for image in images {
            let url = self
                .with_refresh(&mut token, &mut refreshed, |t: String| async move {
                    self.upload_image(cfg, &t, image).await
                })
                .await
                .map_err(media_failure)?;
            image_urls.push(url);
        }

        // Step 2: inventory item keyed by a fresh SKU, so a retried publish
        // creates a new (invisible) draft instead of resurrecting an old one
        let sku = Uuid::new_v4().to_string();
        let sku_ref: &str = &sku;
        let image_urls_ref: &[String] = &image_urls;
        self.with_refresh(&mut token, &mut refreshed, |t: String| async move {
            self.create_inventory_item(cfg, &t, sku_ref, listing, image_urls_ref)
                .await
        })
        .await
        .map_err(listing_failure)?;

        // Step 3: offer creation; business-rule rejections surface verbatim
        let offer_id = self
            .with_refresh(&mut token, &mut refreshed, |t: String| async move {
                self.create_offer(cfg, &t, sku_ref, listing).await
            })
            .await
            .map_err(listing_failure)?;

        // Step 4: activation
        let offer_ref: &str = &offer_id;
        let listing_id = self
            .with_refresh(&mut token, &mut refreshed, |t: String| async move {
                self.publish_offer(cfg, &t, offer_ref).await
            })
            .await
            .map_err(listing_failure)?;

        let item_url = format!("{}/itm/{}", config.site_base_url, listing_id);

        info!(listing_id = %listing_id, "Listing published");
        Ok(PublishedItem {
            listing_id,
            item_url,
        })
    }

    /// Run one pipeline step, refreshing the access token and retrying once
    /// if the marketplace rejects the token. `refreshed` spans the whole
    /// publish call: a single refresh budget, not one per step.
    async fn with_refresh<T, F, Fut>(
        &self,
        token: &mut String,
        refreshed: &mut bool,
        step: F,
    ) -> Result<T, StepError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, StepError>>,
    {
        match step(token.clone()).await {
            Err(StepError::Unauthorized) if !*refreshed => {
                *refreshed = true;
                debug!("Access token rejected mid-publish; refreshing once");

                match self.ebay_service.refresh_access_token().await {
                    Ok(token_set) => {
                        *token = token_set.access_token;
                        step(token.clone()).await
                    }
                    Err(e) => {
                        error!(error = %e, "Refresh during publish failed");
                        Err(StepError::AuthLost)
                    }
                }
            }
            other => other,
        }
    }

    async fn upload_image(
        &self,
        config: &EbayConfig,
        token: &str,
        image: &ImageAsset,
    ) -> Result<String, StepError> {
        // The gating already sniffed the real type; trust it over the
        // browser-declared label
        let mime_type = infer::get(&image.data)
            .map(|kind| kind.mime_type())
            .unwrap_or(&image.mime_type);

        let part = reqwest::multipart::Part::bytes(image.data.to_vec())
            .file_name("image")
            .mime_str(mime_type)
            .map_err(|e| StepError::Malformed(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(format!(
                "{}/commerce/media/v1_beta/image",
                config.api_base_url
            ))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StepError::Transport(e.to_string()))?;

        let response = check_status(response).await?;

        let body = response
            .json::<MediaUploadResponse>()
            .await
            .map_err(|e| StepError::Malformed(e.to_string()))?;

        debug!(image_url = %body.image_url, "Image uploaded");
        Ok(body.image_url)
    }

    async fn create_inventory_item(
        &self,
        config: &EbayConfig,
        token: &str,
        sku: &str,
        listing: &GeneratedListing,
        image_urls: &[String],
    ) -> Result<(), StepError> {
        let aspects: serde_json::Map<String, serde_json::Value> = listing
            .item_specifics
            .iter()
            .map(|s| (s.name.clone(), serde_json::json!([s.value])))
            .collect();

        let payload = serde_json::json!({
            "product": {
                "title": listing.title,
                "description": listing.description,
                "aspects": aspects,
                "imageUrls": image_urls,
            },
            "condition": "USED_GOOD",
        });

        let response = self
            .client
            .put(format!(
                "{}/sell/inventory/v1/inventory_item/{}",
                config.api_base_url, sku
            ))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StepError::Transport(e.to_string()))?;

        check_status(response).await?;

        debug!(sku = %sku, "Inventory item created");
        Ok(())
    }

    async fn create_offer(
        &self,
        config: &EbayConfig,
        token: &str,
        sku: &str,
        listing: &GeneratedListing,
    ) -> Result<String, StepError> {
        let payload = serde_json::json!({
            "sku": sku,
            "marketplaceId": "EBAY_US",
            "format": "FIXED_PRICE",
            "categoryPath": listing.category.join(" > "),
            "listingDescription": listing.description,
        });

        let response = self
            .client
            .post(format!("{}/sell/inventory/v1/offer", config.api_base_url))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StepError::Transport(e.to_string()))?;

        let response = check_status(response).await?;

        let body = response
            .json::<OfferResponse>()
            .await
            .map_err(|e| StepError::Malformed(e.to_string()))?;

        debug!(offer_id = %body.offer_id, "Offer created");
        Ok(body.offer_id)
    }

    async fn publish_offer(
        &self,
        config: &EbayConfig,
        token: &str,
        offer_id: &str,
    ) -> Result<String, StepError> {
        let response = self
            .client
            .post(format!(
                "{}/sell/inventory/v1/offer/{}/publish",
                config.api_base_url, offer_id
            ))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StepError::Transport(e.to_string()))?;

        let response = check_status(response).await?;

        let body = response
            .json::<PublishOfferResponse>()
            .await
            .map_err(|e| StepError::Malformed(e.to_string()))?;

        Ok(body.listing_id)
    }
}

/// Turn a non-success response into the step error carrying the
/// marketplace's own detail message
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StepError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(StepError::Unauthorized);
    }

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(StepError::Status(status, marketplace_message(&body)));
    }

    Ok(response)
}

/// Extract the human-readable message from an eBay error body,
/// `{"errors":[{"message": "..."}]}`, falling back to the raw body
fn marketplace_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("errors")?
                .get(0)?
                .get("message")?
                .as_str()
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn media_failure(e: StepError) -> PublishError {
    match e {
        StepError::Unauthorized | StepError::AuthLost => PublishError::NotConnected,
        StepError::Status(_, msg) | StepError::Transport(msg) | StepError::Malformed(msg) => {
            PublishError::MediaUploadFailed(msg)
        }
    }
}

fn listing_failure(e: StepError) -> PublishError {
    match e {
        StepError::Unauthorized | StepError::AuthLost => PublishError::NotConnected,
        // Client-error statuses carry the marketplace's business-rule
        // rejection for the seller to act on
        StepError::Status(status, msg) if status.is_client_error() => {
            PublishError::ListingRejected(msg)
        }
        StepError::Status(_, msg) | StepError::Transport(msg) | StepError::Malformed(msg) => {
            PublishError::RequestFailed(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::models::ItemSpecific;
    use crate::services::ebay::EbayTokenSet;
    use crate::services::settings::SettingsService;
    use bytes::Bytes;
    use chrono::{DateTime, Duration, Utc};
    use sqlx::sqlite::SqlitePoolOptions;
    use wiremock::matchers::{body_string_contains, header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_settings(server: &MockServer) -> Arc<SettingsService> {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE system_settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                encrypted INTEGER DEFAULT 0,
                updated_at TEXT DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let settings = Arc::new(SettingsService::with_encryption(pool, None));

        settings
            .set_setting("ebay_client_id", "test-client-id", false)
            .await
            .unwrap();
        settings
            .set_setting("ebay_client_secret", "test-client-secret", false)
            .await
            .unwrap();
        settings
            .set_setting(
                "ebay_redirect_uri",
                "http://localhost:8080/api/connection/ebay/callback",
                false,
            )
            .await
            .unwrap();
        settings
            .set_setting("ebay_auth_base_url", &server.uri(), false)
            .await
            .unwrap();
        settings
            .set_setting("ebay_api_base_url", &server.uri(), false)
            .await
            .unwrap();
        settings
            .set_setting("ebay_site_base_url", "https://www.ebay.com", false)
            .await
            .unwrap();

        settings
    }

    async fn seed_token(
        settings: &SettingsService,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) {
        let token_set = EbayTokenSet {
            access_token: access_token.to_string(),
            refresh_token: "refresh-1".to_string(),
            expires_at,
            scope: None,
        };
        settings
            .set_setting(
                "ebay_token_set",
                &serde_json::to_string(&token_set).unwrap(),
                false,
            )
            .await
            .unwrap();
    }

    fn png_asset() -> ImageAsset {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&[0u8; 64]);
        ImageAsset {
            data: Bytes::from(data),
            mime_type: "image/png".to_string(),
        }
    }

    fn listing() -> GeneratedListing {
        GeneratedListing {
            title: "Vintage Nikon FM2 35mm Film Camera Body".to_string(),
            category: vec![
                "Cameras & Photo".to_string(),
                "Film Photography".to_string(),
            ],
            item_specifics: vec![ItemSpecific {
                name: "Brand".to_string(),
                value: "Nikon".to_string(),
            }],
            description: "<p>Fully working FM2 body, light wear.</p>".to_string(),
        }
    }

    async fn mount_happy_marketplace(server: &MockServer, token: &str) {
        Mock::given(method("POST"))
            .and(path("/commerce/media/v1_beta/image"))
            .and(header("authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "imageUrl": "https://i.ebayimg.com/images/g/abc/s-l1600.jpg"
            })))
            .mount(server)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/sell/inventory/v1/inventory_item/[0-9a-f-]+$"))
            .respond_with(ResponseTemplate::new(204))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sell/inventory/v1/offer"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "offerId": "offer-789"
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sell/inventory/v1/offer/offer-789/publish"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "listingId": "123456"
            })))
            .mount(server)
            .await;
    }

    async fn setup_publisher(server: &MockServer) -> (PublisherService, Arc<SettingsService>) {
        let settings = setup_settings(server).await;
        let ebay = Arc::new(EbayService::new(settings.clone()));
        (PublisherService::new(ebay), settings)
    }

    #[tokio::test]
    async fn test_publish_with_zero_images_makes_no_network_call() {
        let server = MockServer::start().await;
        let (publisher, settings) = setup_publisher(&server).await;
        seed_token(&settings, "valid", Utc::now() + Duration::hours(2)).await;

        Mock::given(method("POST"))
            .and(path("/commerce/media/v1_beta/image"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let result = publisher.publish(&listing(), &[]).await;
        assert!(matches!(result, Err(PublishError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_publish_rejects_unsupported_image_before_network() {
        let server = MockServer::start().await;
        let (publisher, settings) = setup_publisher(&server).await;
        seed_token(&settings, "valid", Utc::now() + Duration::hours(2)).await;

        let bogus = ImageAsset {
            data: Bytes::from_static(b"definitely not an image"),
            mime_type: "image/jpeg".to_string(),
        };

        let result = publisher.publish(&listing(), &[bogus]).await;
        assert!(matches!(result, Err(PublishError::InvalidInput(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_when_disconnected_fails_without_upload() {
        let server = MockServer::start().await;
        let (publisher, _settings) = setup_publisher(&server).await;

        let result = publisher.publish(&listing(), &[png_asset()]).await;
        assert!(matches!(result, Err(PublishError::NotConnected)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_happy_path_yields_item_url() {
        let server = MockServer::start().await;
        let (publisher, settings) = setup_publisher(&server).await;
        seed_token(&settings, "valid", Utc::now() + Duration::hours(2)).await;
        mount_happy_marketplace(&server, "valid").await;

        let published = publisher
            .publish(&listing(), &[png_asset(), png_asset()])
            .await
            .unwrap();

        assert_eq!(published.listing_id, "123456");
        assert_eq!(published.item_url, "https://www.ebay.com/itm/123456");
    }

    #[tokio::test]
    async fn test_upload_sends_sniffed_content_type() {
        let server = MockServer::start().await;
        let (publisher, settings) = setup_publisher(&server).await;
        seed_token(&settings, "valid", Utc::now() + Duration::hours(2)).await;

        // PNG bytes mislabelled as JPEG by the browser; the upload part must
        // carry the sniffed type
        let mislabelled = ImageAsset {
            data: png_asset().data,
            mime_type: "image/jpeg".to_string(),
        };

        Mock::given(method("POST"))
            .and(path("/commerce/media/v1_beta/image"))
            .and(body_string_contains("image/png"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "imageUrl": "https://i.ebayimg.com/images/g/abc/s-l1600.jpg"
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_happy_marketplace(&server, "valid").await;

        let published = publisher.publish(&listing(), &[mislabelled]).await.unwrap();
        assert_eq!(published.listing_id, "123456");
    }

    #[tokio::test]
    async fn test_publish_refreshes_expired_token_and_succeeds() {
        let server = MockServer::start().await;
        let (publisher, settings) = setup_publisher(&server).await;
        seed_token(&settings, "stale", Utc::now() - Duration::hours(1)).await;

        Mock::given(method("POST"))
            .and(path("/identity/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "expires_in": 7200,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_happy_marketplace(&server, "fresh").await;

        let published = publisher.publish(&listing(), &[png_asset()]).await.unwrap();
        assert_eq!(published.item_url, "https://www.ebay.com/itm/123456");
    }

    #[tokio::test]
    async fn test_publish_with_revoked_refresh_token_disconnects() {
        let server = MockServer::start().await;
        let (publisher, settings) = setup_publisher(&server).await;
        seed_token(&settings, "stale", Utc::now() - Duration::hours(1)).await;

        Mock::given(method("POST"))
            .and(path("/identity/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "refresh token revoked"
            })))
            .mount(&server)
            .await;

        let result = publisher.publish(&listing(), &[png_asset()]).await;
        assert!(matches!(result, Err(PublishError::NotConnected)));

        // The token store was cleared; the UI now sees a disconnected account
        assert_eq!(
            settings.get_setting("ebay_token_set").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_failed_upload_aborts_publish() {
        let server = MockServer::start().await;
        let (publisher, settings) = setup_publisher(&server).await;
        seed_token(&settings, "valid", Utc::now() + Duration::hours(2)).await;

        Mock::given(method("POST"))
            .and(path("/commerce/media/v1_beta/image"))
            .respond_with(ResponseTemplate::new(500).set_body_string("EPS unavailable"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sell/inventory/v1/offer"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let result = publisher.publish(&listing(), &[png_asset()]).await;
        assert!(matches!(result, Err(PublishError::MediaUploadFailed(_))));
    }

    #[tokio::test]
    async fn test_offer_rejection_surfaces_marketplace_message() {
        let server = MockServer::start().await;
        let (publisher, settings) = setup_publisher(&server).await;
        seed_token(&settings, "valid", Utc::now() + Duration::hours(2)).await;

        Mock::given(method("POST"))
            .and(path("/commerce/media/v1_beta/image"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "imageUrl": "https://i.ebayimg.com/images/g/abc/s-l1600.jpg"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/sell/inventory/v1/inventory_item/[0-9a-f-]+$"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sell/inventory/v1/offer"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "errors": [{
                    "errorId": 25002,
                    "message": "A value is required for item specific: Brand"
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/sell/inventory/v1/offer/.+/publish$"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = publisher.publish(&listing(), &[png_asset()]).await;
        match result {
            Err(PublishError::ListingRejected(msg)) => {
                assert_eq!(msg, "A value is required for item specific: Brand");
            }
            other => panic!("expected ListingRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_midflight_401_triggers_single_refresh_and_retry() {
        let server = MockServer::start().await;
        let (publisher, settings) = setup_publisher(&server).await;
        seed_token(&settings, "just-expired", Utc::now() + Duration::hours(2)).await;

        // The offer step rejects the first token once, then accepts
        Mock::given(method("POST"))
            .and(path("/sell/inventory/v1/offer"))
            .and(header("authorization", "Bearer just-expired"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/identity/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "expires_in": 7200,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/commerce/media/v1_beta/image"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "imageUrl": "https://i.ebayimg.com/images/g/abc/s-l1600.jpg"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/sell/inventory/v1/inventory_item/[0-9a-f-]+$"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sell/inventory/v1/offer"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "offerId": "offer-789"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sell/inventory/v1/offer/offer-789/publish"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "listingId": "123456"
            })))
            .mount(&server)
            .await;

        let published = publisher.publish(&listing(), &[png_asset()]).await.unwrap();
        assert_eq!(published.listing_id, "123456");
    }
}
