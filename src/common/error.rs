// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use crate::services::ebay::EbayError;
use crate::services::openai::OpenAIError;
use crate::services::publisher::PublishError;
use crate::services::settings::SettingsError;

/// API error types surfaced to the UI. Connection and publish failures map
/// one-to-one onto the reasons the UI can act on.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
    InvalidState,
    ExchangeFailed(String),
    NotConnected,
    InvalidInput(String),
    MediaUploadFailed(String),
    ListingRejected(String),
    UpstreamMalformed(String),
    UpstreamUnavailable(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
            ApiError::InvalidState => write!(f, "Authorization state mismatch"),
            ApiError::ExchangeFailed(msg) => write!(f, "Code exchange failed: {}", msg),
            ApiError::NotConnected => write!(f, "No marketplace account connected"),
            ApiError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ApiError::MediaUploadFailed(msg) => write!(f, "Media upload failed: {}", msg),
            ApiError::ListingRejected(msg) => write!(f, "Listing rejected: {}", msg),
            ApiError::UpstreamMalformed(msg) => write!(f, "Generator output unusable: {}", msg),
            ApiError::UpstreamUnavailable(msg) => write!(f, "Upstream unavailable: {}", msg),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::InternalServer(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
            ),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
            ApiError::InvalidState => (
                StatusCode::BAD_REQUEST,
                "Authorization state did not match; please restart the connection flow"
                    .to_string(),
                "INVALID_STATE",
            ),
            ApiError::ExchangeFailed(msg) => (StatusCode::BAD_GATEWAY, msg, "EXCHANGE_FAILED"),
            ApiError::NotConnected => (
                StatusCode::CONFLICT,
                "No marketplace account connected".to_string(),
                "NOT_CONNECTED",
            ),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg, "INVALID_INPUT"),
            ApiError::MediaUploadFailed(msg) => {
                (StatusCode::BAD_GATEWAY, msg, "MEDIA_UPLOAD_FAILED")
            }
            ApiError::ListingRejected(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg, "LISTING_REJECTED")
            }
            ApiError::UpstreamMalformed(msg) => {
                (StatusCode::BAD_GATEWAY, msg, "UPSTREAM_MALFORMED")
            }
            ApiError::UpstreamUnavailable(msg) => {
                (StatusCode::BAD_GATEWAY, msg, "UPSTREAM_UNAVAILABLE")
            }
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::DatabaseError(e)
    }
}

impl From<SettingsError> for ApiError {
    fn from(e: SettingsError) -> Self {
        ApiError::InternalServer(e.to_string())
    }
}

impl From<EbayError> for ApiError {
    fn from(e: EbayError) -> Self {
        match e {
            EbayError::InvalidState => ApiError::InvalidState,
            EbayError::ExchangeFailed(msg) => ApiError::ExchangeFailed(msg),
            // A failed refresh has already cleared the token store
            EbayError::RefreshFailed(_) | EbayError::NotConnected => ApiError::NotConnected,
            EbayError::NotConfigured => {
                ApiError::InternalServer("eBay credentials not configured".to_string())
            }
            other => ApiError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<PublishError> for ApiError {
    fn from(e: PublishError) -> Self {
        match e {
            PublishError::NotConnected => ApiError::NotConnected,
            PublishError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            PublishError::MediaUploadFailed(msg) => ApiError::MediaUploadFailed(msg),
            PublishError::ListingRejected(msg) => ApiError::ListingRejected(msg),
            PublishError::RequestFailed(msg) => ApiError::UpstreamUnavailable(msg),
        }
    }
}

impl From<OpenAIError> for ApiError {
    fn from(e: OpenAIError) -> Self {
        match e {
            OpenAIError::UpstreamMalformed(msg) => ApiError::UpstreamMalformed(msg),
            OpenAIError::NotConfigured => {
                ApiError::InternalServer("OpenAI API key not configured".to_string())
            }
            other => ApiError::UpstreamUnavailable(other.to_string()),
        }
    }
}
