// src/services/openai.rs
//! Listing generation: a single-shot call to the OpenAI chat completions
//! API with the seller's photos attached as data URLs. The model's output
//! is validated before anything downstream may consume it.

use crate::listings::models::{GeneratedListing, ImageAsset};
use crate::listings::validators::validate_generated_listing;
use crate::services::settings::SettingsService;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Generator returned an unusable listing: {0}")]
    UpstreamMalformed(String),

    #[error("Settings error: {0}")]
    SettingsError(String),
}

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    response_format: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

const SYSTEM_PROMPT: &str = "You are a marketplace listing writer. Given photos of a single \
item and an optional seller note, respond with JSON only: {\"title\": string (max 80 chars), \
\"category\": [string, ...] (category path, general to specific), \
\"itemSpecifics\": [{\"name\": string, \"value\": string}, ...], \
\"description\": string (simple HTML)}.";

#[derive(Debug, Clone)]
pub struct OpenAIService {
    settings_service: Arc<SettingsService>,
    client: Client,
}

impl OpenAIService {
    pub fn new(settings_service: Arc<SettingsService>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            settings_service,
            client,
        }
    }

    async fn get_config(&self) -> Result<OpenAIConfig, OpenAIError> {
        let settings = self
            .settings_service
            .get_settings(&["openai_api_key", "openai_base_url", "openai_model"])
            .await
            .map_err(|e| OpenAIError::SettingsError(e.to_string()))?;

        let api_key = settings
            .get("openai_api_key")
            .and_then(|v| v.clone())
            .ok_or(OpenAIError::NotConfigured)?;

        let base_url = settings
            .get("openai_base_url")
            .and_then(|v| v.clone())
            .unwrap_or_else(|| "https://api.openai.com".to_string());

        let model = settings
            .get("openai_model")
            .and_then(|v| v.clone())
            .unwrap_or_else(|| "gpt-4o".to_string());

        Ok(OpenAIConfig {
            api_key,
            base_url,
            model,
        })
    }

    /// Generate a listing from the seller's photos. The `high_quality` flag
    /// asks for a fuller description; the personal note is free-form seller
    /// context (condition details, provenance).
    pub async fn generate_listing(
        &self,
        images: &[ImageAsset],
        personal_note: &str,
        high_quality: bool,
    ) -> Result<GeneratedListing, OpenAIError> {
        let config = self.get_config().await?;

        let mut content = vec![serde_json::json!({
            "type": "text",
            "text": build_user_prompt(personal_note, high_quality),
        })];

        for image in images {
            content.push(serde_json::json!({
                "type": "image_url",
                "image_url": {
                    "url": format!(
                        "data:{};base64,{}",
                        image.mime_type,
                        BASE64.encode(&image.data)
                    )
                }
            }));
        }

        let request = ChatCompletionRequest {
            model: config.model.clone(),
            messages: vec![
                serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
                serde_json::json!({ "role": "user", "content": content }),
            ],
            response_format: serde_json::json!({ "type": "json_object" }),
        };

        debug!(model = %config.model, images = images.len(), "Requesting listing generation");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", config.base_url))
            .bearer_auth(&config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| OpenAIError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Listing generation request failed");
            return Err(OpenAIError::RequestFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| OpenAIError::UpstreamMalformed(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| OpenAIError::UpstreamMalformed("empty completion".to_string()))?;

        let listing = parse_generated_listing(content)?;

        info!(title = %listing.title, "Listing generated");
        Ok(listing)
    }
}

fn build_user_prompt(personal_note: &str, high_quality: bool) -> String {
    let mut prompt = String::from("Write a listing for the item in these photos.");

    if high_quality {
        prompt.push_str(" Write a thorough, well-structured description.");
    } else {
        prompt.push_str(" Keep the description short.");
    }

    if !personal_note.trim().is_empty() {
        prompt.push_str("\nSeller note: ");
        prompt.push_str(personal_note.trim());
    }

    prompt
}

/// Parse and shape-check the model output. Anything that fails here is
/// rejected and never reaches the publish pipeline.
fn parse_generated_listing(content: &str) -> Result<GeneratedListing, OpenAIError> {
    let listing: GeneratedListing = serde_json::from_str(content)
        .map_err(|e| OpenAIError::UpstreamMalformed(e.to_string()))?;

    validate_generated_listing(&listing).map_err(OpenAIError::UpstreamMalformed)?;

    Ok(listing)
}
