//! Data models for carecost

pub mod plan;
pub mod query;
pub mod record;
pub mod stats;

pub use plan::{FileKind, PlanFile, PlanId};
pub use query::{parse_zip5, Query, SearchResults, SortBy, StatsResult};
pub use record::{Dataset, PriceRecord, ProcedureSummary, ProviderRate};
pub use stats::{Quartiles, SummaryStat, SummaryTable};
