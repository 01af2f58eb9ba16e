// src/listings/models.rs
//! Listing payloads exchanged with the UI and the generation collaborator.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A single structured attribute required by marketplace category rules,
/// e.g. { "Brand": "Nikon" }
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemSpecific {
    pub name: String,
    pub value: String,
}

/// AI-generated listing content. Immutable input to the publish pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedListing {
    /// Listing title, at most 80 characters by contract with the generator
    pub title: String,
    /// Category path from most general to most specific, never empty
    pub category: Vec<String>,
    /// Ordered name/value pairs (Brand, Condition, ...). The key must be
    /// present in generator output; an empty list is a valid value.
    pub item_specifics: Vec<ItemSpecific>,
    /// HTML description
    pub description: String,
}

/// Raw image bytes as selected in the UI
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub data: Bytes,
    pub mime_type: String,
}

/// Terminal outcome of one publish attempt. `item_url` is present iff the
/// listing went live; never partially populated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl PublishResult {
    pub fn published(item_url: String) -> Self {
        Self {
            success: true,
            item_url: Some(item_url),
            failure_reason: None,
        }
    }

    pub fn failed(reason: String) -> Self {
        Self {
            success: false,
            item_url: None,
            failure_reason: Some(reason),
        }
    }
}
