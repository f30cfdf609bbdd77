//! Percentile summary lookup across every loaded summary table

use crate::error::QueryErrorKind;
use crate::models::StatsResult;
use crate::store::DataStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub struct StatsAggregator {
    store: Arc<DataStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }

    /// Quartiles per plan for an exact procedure name.
    ///
    /// Tables without the procedure are skipped; if none match the result
    /// carries `NoStatisticsAvailable` and an empty map.
    pub fn stats_for(&self, procedure: &str) -> StatsResult {
        let mut data = BTreeMap::new();

        for table in self.store.summaries() {
            if let Some(row) = table.find(procedure) {
                data.insert(table.plan.clone(), row.quartiles);
            }
        }

        if data.is_empty() {
            debug!(procedure, tables = self.store.summary_count(), "No summary table matched");
            return StatsResult::failed(QueryErrorKind::NoStatisticsAvailable);
        }

        StatsResult::found(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::RawFile;
    use crate::models::PlanId;

    fn aggregator() -> StatsAggregator {
        let (store, _) = DataStore::load(vec![
            RawFile::new(
                "summary_Austin_Aetna_PPO.csv",
                "procedure_name,min,Q1,median,Q3,max\nMRI Brain,300,400,500,600,700\n",
            ),
            RawFile::new(
                "summary_Austin_Cigna_OAP.csv",
                "procedure_name,min,Q1,median,Q3,max\nMRI Brain,250,350,450,550,650\nCT Head,100,150,200,250,300\n",
            ),
            RawFile::new(
                "summary_Austin_BCBS_Essentials.csv",
                "procedure_name,min,Q1,median,Q3,max\nCT Head,90,140,190,240,290\n",
            ),
        ]);
        StatsAggregator::new(Arc::new(store))
    }

    #[test]
    fn test_stats_across_plans() {
        let result = aggregator().stats_for("MRI Brain");
        assert!(result.error.is_none());
        assert_eq!(result.data.len(), 2);
        assert_eq!(result.data[&PlanId::new("Aetna", "PPO")].median, 500.0);
        assert_eq!(result.data[&PlanId::new("Cigna", "OAP")].q1, 350.0);
        assert!(!result.data.contains_key(&PlanId::new("BCBS", "Essentials")));
    }

    #[test]
    fn test_no_match_is_no_statistics_available() {
        let result = aggregator().stats_for("PET Scan");
        assert_eq!(result.error, Some(QueryErrorKind::NoStatisticsAvailable));
        assert!(result.data.is_empty());
    }

    #[test]
    fn test_empty_store_has_no_statistics() {
        let result = StatsAggregator::new(Arc::new(DataStore::empty())).stats_for("MRI Brain");
        assert_eq!(result.error, Some(QueryErrorKind::NoStatisticsAvailable));
    }
}
