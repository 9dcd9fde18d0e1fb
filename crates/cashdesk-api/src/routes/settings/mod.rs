//! Settings routes - Configuration display

pub mod api;

pub use api::api_settings;
