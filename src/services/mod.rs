// src/services/mod.rs
//
// Shared services: marketplace connection, publishing pipeline,
// listing generation and the settings/encryption layer they sit on

pub mod ebay;
pub mod encryption;
pub mod openai;
pub mod publisher;
pub mod settings;

// Re-export commonly used types for convenience
pub use ebay::EbayService;
pub use openai::OpenAIService;
pub use publisher::PublisherService;
pub use settings::SettingsService;
