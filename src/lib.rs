// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod app;
pub mod category;
pub mod chain;
pub mod config;
pub mod metrics;
pub mod model;
pub mod push;
pub mod scrape;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::app::{spawn_scheduler, AppState};
pub use crate::category::Category;
pub use crate::model::{CategorySummary, RawSourceRecord, ScrapeBatch, TrendSnapshot};
pub use crate::store::{CachePolicy, TrendError, TrendStore};
