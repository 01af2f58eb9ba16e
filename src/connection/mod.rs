// Connection module - eBay account linking over OAuth

pub mod handlers;
pub mod routes;

pub use routes::connection_routes;
