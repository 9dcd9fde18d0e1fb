//! Route modules for the API server
//!
//! - stats: snapshot JSON, refresh, dashboard page
//! - categories: one endpoint per user intent on a cash category
//! - settings: configuration display
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page rendering

pub mod stats;
pub mod categories;
pub mod settings;
