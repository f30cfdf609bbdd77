//! Query request and result objects

use super::plan::PlanId;
use super::record::ProviderRate;
use super::stats::Quartiles;
use crate::error::QueryErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Ascending negotiated rate
    #[default]
    Price,
    /// Ascending zip-distance from the query zipcode
    Proximity,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Price => "price",
            SortBy::Proximity => "proximity",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price" => Ok(SortBy::Price),
            "proximity" | "distance" => Ok(SortBy::Proximity),
            other => Err(format!("unknown sort order '{}' (expected price|proximity)", other)),
        }
    }
}

/// Filter/sort request for one plan and procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub insurance: String,
    pub insurance_type: String,
    /// Exact, case-sensitive procedure name
    pub procedure: String,
    pub zipcode: Option<String>,
    pub sort_by: SortBy,
    /// Case-insensitive provider name substring
    pub provider: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Radius in miles
    pub distance: Option<f64>,
}

impl Query {
    pub fn new(plan: &PlanId, procedure: impl Into<String>) -> Self {
        Self {
            insurance: plan.insurance.clone(),
            insurance_type: plan.plan_type.clone(),
            procedure: procedure.into(),
            zipcode: None,
            sort_by: SortBy::Price,
            provider: None,
            min_price: None,
            max_price: None,
            distance: None,
        }
    }

    pub fn plan(&self) -> PlanId {
        PlanId::new(self.insurance.clone(), self.insurance_type.clone())
    }

    pub fn with_zipcode(mut self, zipcode: impl Into<String>) -> Self {
        self.zipcode = Some(zipcode.into());
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_price_range(mut self, min_price: Option<f64>, max_price: Option<f64>) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_distance(mut self, miles: f64) -> Self {
        self.distance = Some(miles);
        self
    }

    /// Query zipcode as a 5-digit integer, if present and valid
    pub fn zip5(&self) -> Option<u32> {
        self.zipcode.as_deref().and_then(parse_zip5)
    }

    /// Provider filter with surrounding whitespace removed; blank means absent
    pub fn provider_filter(&self) -> Option<&str> {
        self.provider
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Parse the first five characters of a postal code as an integer
pub fn parse_zip5(postal_code: &str) -> Option<u32> {
    let prefix: String = postal_code.trim().chars().take(5).collect();
    if prefix.is_empty() {
        return None;
    }
    prefix.parse().ok()
}

/// `{error, records}` answer for a result search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub error: Option<QueryErrorKind>,
    pub records: Vec<ProviderRate>,
}

impl SearchResults {
    pub fn found(records: Vec<ProviderRate>) -> Self {
        Self {
            error: None,
            records,
        }
    }

    pub fn failed(kind: QueryErrorKind) -> Self {
        Self {
            error: Some(kind),
            records: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// `{error, data}` answer for a statistics lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    pub error: Option<QueryErrorKind>,
    pub data: BTreeMap<PlanId, Quartiles>,
}

impl StatsResult {
    pub fn found(data: BTreeMap<PlanId, Quartiles>) -> Self {
        Self { error: None, data }
    }

    pub fn failed(kind: QueryErrorKind) -> Self {
        Self {
            error: Some(kind),
            data: BTreeMap::new(),
        }
    }
}
