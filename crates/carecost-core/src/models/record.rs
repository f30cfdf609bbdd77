//! Negotiated-rate rows and their query projections

use super::plan::PlanId;
use serde::{Deserialize, Serialize};

/// One negotiated-rate row as loaded from a data file
///
/// Header aliases cover both the snake_case export format and the long-form
/// NPPES column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub procedure_name: String,

    pub billing_code: String,

    pub negotiated_rate: f64,

    #[serde(alias = "Provider Organization Name (Legal Business Name)")]
    pub provider_name: String,

    #[serde(alias = "npi")]
    pub provider_npi: String,

    #[serde(
        default,
        alias = "Provider First Line Business Practice Location Address"
    )]
    pub address_line_1: String,

    #[serde(
        default,
        alias = "Provider Second Line Business Practice Location Address"
    )]
    pub address_line_2: String,

    #[serde(
        default,
        alias = "Provider Business Practice Location Address City Name"
    )]
    pub city: String,

    #[serde(
        default,
        alias = "Provider Business Practice Location Address State Name"
    )]
    pub state: String,

    /// Only the first five characters are meaningful
    #[serde(
        default,
        alias = "Provider Business Practice Location Address Postal Code"
    )]
    pub postal_code: String,
}

impl PriceRecord {
    /// Integer value of the 5-digit postal prefix, if it parses
    pub fn zip5(&self) -> Option<u32> {
        super::query::parse_zip5(&self.postal_code)
    }
}

/// Ordered, immutable rows for one plan
///
/// Row order is the file order and acts as the tie-break for sorting.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub plan: PlanId,
    pub location: String,
    pub records: Vec<PriceRecord>,
}

impl Dataset {
    pub fn new(plan: PlanId, location: impl Into<String>, records: Vec<PriceRecord>) -> Self {
        Self {
            plan,
            location: location.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// `(procedure_name, billing_code)` pair returned by procedure search
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcedureSummary {
    pub procedure_name: String,
    pub billing_code: String,
}

/// Provider-facing projection of a [`PriceRecord`] returned by result search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRate {
    pub negotiated_rate: f64,
    pub provider_name: String,
    pub provider_npi: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// Zip-distance from the query zipcode, present when it could be computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_distance: Option<u32>,
}

impl ProviderRate {
    pub fn project(record: &PriceRecord, zip_distance: Option<u32>) -> Self {
        Self {
            negotiated_rate: record.negotiated_rate,
            provider_name: record.provider_name.clone(),
            provider_npi: record.provider_npi.clone(),
            address_line_1: record.address_line_1.clone(),
            address_line_2: record.address_line_2.clone(),
            city: record.city.clone(),
            state: record.state.clone(),
            postal_code: record.postal_code.clone(),
            zip_distance,
        }
    }
}
