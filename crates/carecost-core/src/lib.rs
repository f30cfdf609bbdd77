//! carecost-core - Query and cache engine for negotiated procedure prices
//!
//! Loads plan datasets and percentile summaries once, answers filtered and
//! sorted lookups against them, and fronts those lookups with a tiered cache.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod distance;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod parsers;
pub mod service;
pub mod store;

pub use aggregator::StatsAggregator;
pub use cache::TieredCache;
pub use config::CareCostConfig;
pub use discovery::RawFile;
pub use engine::QueryEngine;
pub use error::{CoreError, DegradedState, LoadReport, QueryErrorKind};
pub use export::export_results_to_csv;
pub use service::PriceService;
pub use store::DataStore;
