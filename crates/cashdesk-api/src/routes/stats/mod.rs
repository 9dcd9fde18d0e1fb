//! Statistics routes - snapshot, refresh and the dashboard page

pub mod api;
pub mod page;

pub use api::{api_stats, api_refresh};
pub use page::{page_dashboard, render_category_card};
