//! Query-string parameters
//!
//! Every field arrives as an optional string so a bad number never rejects
//! the whole request; unparseable values are dropped as if absent.

use carecost_core::models::{PlanId, Query, SortBy};
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
pub struct ProcedureParams {
    pub plan: Option<String>,
    #[serde(rename = "type")]
    pub plan_type: Option<String>,
    pub term: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub plan: Option<String>,
    #[serde(rename = "type")]
    pub plan_type: Option<String>,
    pub procedure: Option<String>,
    pub zipcode: Option<String>,
    pub sort: Option<String>,
    pub provider: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub distance: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub procedure: Option<String>,
}

impl ProcedureParams {
    pub fn plan(&self) -> Option<PlanId> {
        plan_from(self.plan.as_deref(), self.plan_type.as_deref())
    }
}

impl SearchParams {
    /// Build a query, or `None` when plan or procedure is missing
    pub fn to_query(&self) -> Option<Query> {
        let plan = plan_from(self.plan.as_deref(), self.plan_type.as_deref())?;
        let procedure = non_blank(self.procedure.as_deref())?;

        let mut query = Query::new(&plan, procedure)
            .with_price_range(
                amount("min_price", self.min_price.as_deref()),
                amount("max_price", self.max_price.as_deref()),
            )
            .with_sort(lenient::<SortBy>("sort", self.sort.as_deref()).unwrap_or_default());

        if let Some(zipcode) = non_blank(self.zipcode.as_deref()) {
            query = query.with_zipcode(zipcode);
        }
        if let Some(provider) = non_blank(self.provider.as_deref()) {
            query = query.with_provider(provider);
        }
        if let Some(miles) = amount("distance", self.distance.as_deref()) {
            query = query.with_distance(miles);
        }
        Some(query)
    }
}

fn plan_from(insurance: Option<&str>, plan_type: Option<&str>) -> Option<PlanId> {
    let insurance = non_blank(insurance)?;
    Some(PlanId::new(insurance, plan_type.map(str::trim).unwrap_or("")))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn lenient<T: FromStr>(name: &str, value: Option<&str>) -> Option<T> {
    let raw = non_blank(value)?;
    match raw.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            debug!(param = name, value = raw, "Ignoring malformed parameter");
            None
        }
    }
}

/// Prices and radii: `NaN`, `inf` and negatives parse as floats but are dropped
fn amount(name: &str, value: Option<&str>) -> Option<f64> {
    let parsed = lenient::<f64>(name, value)?;
    if parsed.is_finite() && parsed >= 0.0 {
        Some(parsed)
    } else {
        debug!(param = name, value = parsed, "Ignoring out-of-range parameter");
        None
    }
}
