// Listings module - AI-generated listing content and eBay publishing

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

pub use routes::listings_routes;
