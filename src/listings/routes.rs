// src/listings/routes.rs

use axum::{extract::DefaultBodyLimit, routing::post, Router};

use super::handlers;
use super::validators::{MAX_IMAGES, MAX_IMAGE_BYTES};

/// Listing generation and publishing routes. The body limit allows a full
/// batch of images plus form overhead.
pub fn listings_routes() -> Router {
    Router::new()
        .route("/api/listings/generate", post(handlers::generate_listing))
        .route("/api/listings/publish", post(handlers::publish_listing))
        .layer(DefaultBodyLimit::max(MAX_IMAGES * MAX_IMAGE_BYTES + 64 * 1024))
}
