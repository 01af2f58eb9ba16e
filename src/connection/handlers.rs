// src/connection/handlers.rs
//! eBay account connection endpoints: auth-url, OAuth callback, status and
//! disconnect. The callback renders a small popup page that reports the
//! outcome back to the opener window.

use axum::{
    extract::{Extension, Query},
    response::Html,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::common::{ApiError, AppState};

/// GET /api/connection/ebay/auth-url - Start an authorization round trip
pub async fn get_ebay_auth_url(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    info!("Generating eBay authorization URL");

    let auth_url = state.ebay_service.begin_authorization().await.map_err(|e| {
        error!(error = %e, "Failed to generate eBay authorization URL");
        ApiError::from(e)
    })?;

    let config = state.ebay_service.get_config().await?;

    Ok(Json(serde_json::json!({
        "auth_url": auth_url,
        "redirect_uri": config.redirect_uri
    })))
}

/// GET /api/connection/ebay/callback - Handle the eBay OAuth redirect
pub async fn ebay_oauth_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();

    // eBay reports user denial and transport problems as an error param
    if let Some(error) = params.get("error") {
        error!(oauth_error = %error, "eBay OAuth returned error");
        return Ok(Html(popup_page(
            "Authorization Failed",
            &format!("eBay reported: {}", error),
            "EBAY_OAUTH_ERROR",
        )));
    }

    let code = params.get("code").ok_or_else(|| {
        warn!("No authorization code in OAuth callback");
        ApiError::BadRequest("No authorization code provided".to_string())
    })?;

    let callback_state = params.get("state").ok_or_else(|| {
        warn!("No state in OAuth callback");
        ApiError::BadRequest("No state provided".to_string())
    })?;

    info!("Received eBay OAuth callback with authorization code");

    match state
        .ebay_service
        .complete_authorization(code, callback_state)
        .await
    {
        Ok(_) => {
            info!("eBay tokens exchanged and stored");
            Ok(Html(popup_page(
                "Authorization Successful",
                "Your eBay account is connected. This window will close automatically.",
                "EBAY_OAUTH_SUCCESS",
            )))
        }
        Err(e) => {
            error!(error = %e, "Failed to complete eBay authorization");
            Ok(Html(popup_page(
                "Authorization Failed",
                &format!("Failed to complete authorization: {}", e),
                "EBAY_OAUTH_ERROR",
            )))
        }
    }
}

/// GET /api/connection/ebay/status - Local connection check, no network call
pub async fn get_ebay_connection_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let connected = state.ebay_service.is_connected().await;

    Ok(Json(serde_json::json!({ "connected": connected })))
}

/// POST /api/connection/ebay/disconnect - Drop the stored authorization
pub async fn disconnect_ebay_account(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    info!("Disconnecting eBay account");

    state.ebay_service.disconnect().await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "eBay account disconnected"
    })))
}

/// Minimal self-closing popup page that posts the outcome to the opener
fn popup_page(title: &str, message: &str, event_type: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <style>
        body {{ font-family: system-ui, sans-serif; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: #f3f4f6; }}
        .container {{ text-align: center; padding: 2rem; background: white; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); max-width: 400px; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        <p>{message}</p>
        <script>
            window.opener && window.opener.postMessage({{ type: '{event_type}' }}, '*');
            setTimeout(() => window.close(), 2000);
        </script>
    </div>
</body>
</html>
"#
    )
}
