// src/connection/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// eBay account connection routes
pub fn connection_routes() -> Router {
    Router::new()
        .route(
            "/api/connection/ebay/auth-url",
            get(handlers::get_ebay_auth_url),
        )
        .route(
            "/api/connection/ebay/callback",
            get(handlers::ebay_oauth_callback),
        )
        .route(
            "/api/connection/ebay/status",
            get(handlers::get_ebay_connection_status),
        )
        .route(
            "/api/connection/ebay/disconnect",
            post(handlers::disconnect_ebay_account),
        )
}
