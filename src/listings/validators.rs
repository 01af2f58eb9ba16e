// src/listings/validators.rs
//! Input gating for listing generation and publishing. These checks run
//! before any network round trip is spent.

use super::models::{GeneratedListing, ImageAsset};

/// Upper bound on images per listing
pub const MAX_IMAGES: usize = 8;

/// Upper bound on a single image payload: 5MB
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Maximum listing title length accepted by the marketplace
pub const MAX_TITLE_CHARS: usize = 80;

/// Validate image count, per-image size and content type
pub fn validate_images(images: &[ImageAsset]) -> Result<(), String> {
    if images.is_empty() {
        return Err("At least one image is required".to_string());
    }

    if images.len() > MAX_IMAGES {
        return Err(format!(
            "Too many images: {} provided, at most {} allowed",
            images.len(),
            MAX_IMAGES
        ));
    }

    for (index, image) in images.iter().enumerate() {
        if image.data.len() > MAX_IMAGE_BYTES {
            return Err(format!("Image {} exceeds the 5MB size limit", index + 1));
        }

        if !is_supported_image_type(&image.data) {
            return Err(format!(
                "Image {} has an unsupported type. Only JPEG, PNG, GIF and WebP are accepted",
                index + 1
            ));
        }
    }

    Ok(())
}

/// Validate the shape of generator output before it is shown or published
pub fn validate_generated_listing(listing: &GeneratedListing) -> Result<(), String> {
    if listing.title.trim().is_empty() {
        return Err("Listing title is empty".to_string());
    }

    if listing.title.chars().count() > MAX_TITLE_CHARS {
        return Err(format!(
            "Listing title exceeds {} characters",
            MAX_TITLE_CHARS
        ));
    }

    if listing.category.is_empty() {
        return Err("Listing category path is empty".to_string());
    }

    if listing.description.trim().is_empty() {
        return Err("Listing description is empty".to_string());
    }

    Ok(())
}

/// Sniff magic bytes; the browser-supplied mime type is not trusted
fn is_supported_image_type(data: &[u8]) -> bool {
    let info = infer::Infer::new();

    match info.get(data) {
        Some(kind) => matches!(
            kind.mime_type(),
            "image/jpeg" | "image/png" | "image/gif" | "image/webp"
        ),
        None => false,
    }
}
