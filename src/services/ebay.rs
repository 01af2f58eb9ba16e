// src/services/ebay.rs
//! eBay account connection: OAuth2 authorization-code flow, token
//! persistence and the connection state used to gate publishing.
//!
//! The token set is stored as a single (encrypted) settings value so that
//! replacement on refresh is atomic; a reader never sees an access token
//! paired with a stale refresh token.

use crate::services::settings::{SettingsError, SettingsService};
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const TOKEN_SET_KEY: &str = "ebay_token_set";
const STATE_KEY: &str = "ebay_oauth_state";
const STATE_ISSUED_AT_KEY: &str = "ebay_oauth_state_issued_at";

/// One authorization round trip must finish within this window
const STATE_TTL_MINUTES: i64 = 10;

/// Access tokens this close to expiry are refreshed before use
const REFRESH_MARGIN_MINUTES: i64 = 5;

const SCOPES: &[&str] = &[
    "https://api.ebay.com/oauth/api_scope/sell.inventory",
    "https://api.ebay.com/oauth/api_scope/sell.account",
];

#[derive(Debug, thiserror::Error)]
pub enum EbayError {
    #[error("eBay credentials not configured")]
    NotConfigured,

    #[error("Authorization state mismatch")]
    InvalidState,

    #[error("Code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("No eBay account connected")]
    NotConnected,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Debug, Clone)]
pub struct EbayConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub site_base_url: String,
}

impl EbayConfig {
    pub fn token_url(&self) -> String {
        format!("{}/identity/v1/oauth2/token", self.api_base_url)
    }
}

/// The current authorization grant for the connected seller account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EbayTokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub scope: Option<String>,
}

impl EbayTokenSet {
    /// Whether the access token needs a refresh before the next API call
    pub fn needs_refresh(&self) -> bool {
        self.expires_at <= Utc::now() + Duration::minutes(REFRESH_MARGIN_MINUTES)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EbayService {
    settings_service: Arc<SettingsService>,
    client: Client,
}

impl EbayService {
    pub fn new(settings_service: Arc<SettingsService>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            settings_service,
            client,
        }
    }

    /// Load the eBay configuration from settings (with env fallback)
    pub async fn get_config(&self) -> Result<EbayConfig, EbayError> {
        let keys = [
            "ebay_client_id",
            "ebay_client_secret",
            "ebay_redirect_uri",
            "ebay_auth_base_url",
            "ebay_api_base_url",
            "ebay_site_base_url",
        ];

        let settings = self.settings_service.get_settings(&keys).await?;

        let client_id = settings
            .get("ebay_client_id")
            .and_then(|v| v.clone())
            .ok_or(EbayError::NotConfigured)?;

        let client_secret = settings
            .get("ebay_client_secret")
            .and_then(|v| v.clone())
            .ok_or(EbayError::NotConfigured)?;

        let redirect_uri = settings
            .get("ebay_redirect_uri")
            .and_then(|v| v.clone())
            .ok_or(EbayError::NotConfigured)?;

        let auth_base_url = settings
            .get("ebay_auth_base_url")
            .and_then(|v| v.clone())
            .unwrap_or_else(|| "https://auth.ebay.com".to_string());

        let api_base_url = settings
            .get("ebay_api_base_url")
            .and_then(|v| v.clone())
            .unwrap_or_else(|| "https://api.ebay.com".to_string());

        let site_base_url = settings
            .get("ebay_site_base_url")
            .and_then(|v| v.clone())
            .unwrap_or_else(|| "https://www.ebay.com".to_string());

        Ok(EbayConfig {
            client_id,
            client_secret,
            redirect_uri,
            auth_base_url,
            api_base_url,
            site_base_url,
        })
    }

    /// Start an authorization round trip: persist a fresh state nonce and
    /// return the authorization URL to redirect the seller to.
    ///
    /// Only one authorization attempt is live at a time; calling this again
    /// invalidates the nonce of any attempt still in flight.
    pub async fn begin_authorization(&self) -> Result<String, EbayError> {
        let config = self.get_config().await?;

        let state: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        self.settings_service
            .set_setting(STATE_KEY, &state, false)
            .await?;
        self.settings_service
            .set_setting(STATE_ISSUED_AT_KEY, &Utc::now().to_rfc3339(), false)
            .await?;

        let scope_param = SCOPES.join(" ");

        let auth_url = format!(
            "{}/oauth2/authorize?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            config.auth_base_url,
            urlencoding::encode(&config.client_id),
            urlencoding::encode(&config.redirect_uri),
            urlencoding::encode(&scope_param),
            urlencoding::encode(&state)
        );

        debug!("Generated eBay authorization URL");
        Ok(auth_url)
    }

    /// Finish an authorization round trip: verify the callback state against
    /// the outstanding nonce, then exchange the code for a token set.
    ///
    /// A state mismatch fails before any network call and leaves the token
    /// store untouched. Codes are single-use on the marketplace side; a
    /// replayed code is rejected there and surfaces as `ExchangeFailed`.
    pub async fn complete_authorization(
        &self,
        code: &str,
        state: &str,
    ) -> Result<EbayTokenSet, EbayError> {
        let config = self.get_config().await?;

        let stored_state = self.settings_service.get_setting(STATE_KEY).await?;
        let issued_at = self
            .settings_service
            .get_setting(STATE_ISSUED_AT_KEY)
            .await?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let valid = match (stored_state, issued_at) {
            (Some(stored), Some(issued)) => {
                stored == state && issued + Duration::minutes(STATE_TTL_MINUTES) > Utc::now()
            }
            _ => false,
        };

        if !valid {
            warn!("eBay OAuth callback rejected: state nonce missing, stale or mismatched");
            return Err(EbayError::InvalidState);
        }

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &config.redirect_uri),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(config.token_url())
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(|e| EbayError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Code exchange failed");
            return Err(EbayError::ExchangeFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| EbayError::SerializationError(e.to_string()))?;

        let refresh_token = token_response.refresh_token.ok_or_else(|| {
            EbayError::ExchangeFailed("Token endpoint returned no refresh token".to_string())
        })?;

        let token_set = EbayTokenSet {
            access_token: token_response.access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(token_response.expires_in),
            scope: token_response.scope,
        };

        self.store_token_set(&token_set).await?;

        info!("eBay account connected");
        Ok(token_set)
    }

    /// Obtain a new access token with the stored refresh token.
    ///
    /// A rejected refresh token clears the token store: the connection state
    /// machine returns to "disconnected" instead of presenting a connected
    /// but unusable account.
    pub async fn refresh_access_token(&self) -> Result<EbayTokenSet, EbayError> {
        let config = self.get_config().await?;

        let current = self
            .load_token_set()
            .await?
            .ok_or(EbayError::NotConnected)?;

        let scope_param = SCOPES.join(" ");
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", &current.refresh_token),
            ("scope", &scope_param),
        ];

        debug!("Refreshing eBay access token");

        let response = self
            .client
            .post(config.token_url())
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(|e| EbayError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                status = %status,
                error = %error_text,
                "Token refresh rejected; clearing stored tokens"
            );

            // Dead refresh token: force reauthorization rather than retry
            self.clear_token_set().await?;

            return Err(EbayError::RefreshFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| EbayError::SerializationError(e.to_string()))?;

        let token_set = EbayTokenSet {
            access_token: token_response.access_token,
            // The refresh grant usually omits the refresh token; keep ours
            refresh_token: token_response
                .refresh_token
                .unwrap_or(current.refresh_token),
            expires_at: Utc::now() + Duration::seconds(token_response.expires_in),
            scope: token_response.scope.or(current.scope),
        };

        self.store_token_set(&token_set).await?;

        info!("eBay access token refreshed");
        Ok(token_set)
    }

    /// Return an access token valid for at least the refresh margin,
    /// refreshing once when necessary
    pub async fn valid_access_token(&self) -> Result<String, EbayError> {
        let current = self
            .load_token_set()
            .await?
            .ok_or(EbayError::NotConnected)?;

        if !current.needs_refresh() {
            return Ok(current.access_token);
        }

        debug!("Stored access token expired or expiring; refreshing");
        let refreshed = self.refresh_access_token().await?;
        Ok(refreshed.access_token)
    }

    /// Whether a token set with a presumed-valid refresh token is stored.
    /// Purely local: an expired access token alone does not disconnect the
    /// account, and no network call is made here.
    pub async fn is_connected(&self) -> bool {
        match self.load_token_set().await {
            Ok(token_set) => token_set.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read token store; reporting disconnected");
                false
            }
        }
    }

    /// Drop the stored token set and any outstanding authorization nonce.
    /// Idempotent: disconnecting an already-disconnected account is a no-op.
    pub async fn disconnect(&self) -> Result<(), EbayError> {
        self.settings_service.delete_setting(TOKEN_SET_KEY).await?;
        self.settings_service.delete_setting(STATE_KEY).await?;
        self.settings_service
            .delete_setting(STATE_ISSUED_AT_KEY)
            .await?;

        info!("eBay account disconnected");
        Ok(())
    }

    async fn store_token_set(&self, token_set: &EbayTokenSet) -> Result<(), EbayError> {
        let json = serde_json::to_string(token_set)
            .map_err(|e| EbayError::SerializationError(e.to_string()))?;

        let encrypt = self.settings_service.is_encryption_available();
        self.settings_service
            .set_setting(TOKEN_SET_KEY, &json, encrypt)
            .await?;

        Ok(())
    }

    async fn load_token_set(&self) -> Result<Option<EbayTokenSet>, EbayError> {
        let value = self.settings_service.get_setting(TOKEN_SET_KEY).await?;

        match value {
            Some(json) => {
                let token_set = serde_json::from_str(&json)
                    .map_err(|e| EbayError::SerializationError(e.to_string()))?;
                Ok(Some(token_set))
            }
            None => Ok(None),
        }
    }

    async fn clear_token_set(&self) -> Result<(), EbayError> {
        self.settings_service.delete_setting(TOKEN_SET_KEY).await?;
        Ok(())
    }
}
