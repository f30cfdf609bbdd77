//! Percentile summary rows loaded from `summary_*` files

use super::plan::PlanId;
use serde::{Deserialize, Serialize};

/// Five-number summary for one procedure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub min: f64,
    #[serde(rename = "Q1")]
    pub q1: f64,
    pub median: f64,
    #[serde(rename = "Q3")]
    pub q3: f64,
    pub max: f64,
}

/// One row of a summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStat {
    pub procedure_name: String,
    #[serde(flatten)]
    pub quartiles: Quartiles,
}

/// Summary table for one plan, in file order
#[derive(Debug, Clone)]
pub struct SummaryTable {
    pub plan: PlanId,
    pub location: String,
    pub rows: Vec<SummaryStat>,
}

impl SummaryTable {
    pub fn new(plan: PlanId, location: impl Into<String>, rows: Vec<SummaryStat>) -> Self {
        Self {
            plan,
            location: location.into(),
            rows,
        }
    }

    /// First row whose procedure name matches exactly
    pub fn find(&self, procedure: &str) -> Option<&SummaryStat> {
        self.rows.iter().find(|row| row.procedure_name == procedure)
    }
}
