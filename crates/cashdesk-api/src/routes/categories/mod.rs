//! Category routes - select, create, view open, movement analysis

pub mod api;

pub use api::api_category_intent;
