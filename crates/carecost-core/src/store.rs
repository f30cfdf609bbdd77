//! Immutable, plan-indexed data store
//!
//! Built once by a single-threaded load and never mutated afterwards, so
//! concurrent readers share it behind an `Arc` without locking.

use crate::config::DataConfig;
use crate::discovery::{discover, RawFile};
use crate::error::{CoreError, DegradedState, LoadError, LoadReport};
use crate::models::{Dataset, FileKind, PlanId, SummaryTable};
use crate::parsers::{decode_price_table, decode_summary_table, parse_file_name};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// All loaded datasets and summary tables, keyed by plan
#[derive(Debug)]
pub struct DataStore {
    datasets: BTreeMap<PlanId, Arc<Dataset>>,
    summaries: BTreeMap<PlanId, Arc<SummaryTable>>,
    degraded_state: DegradedState,
    loaded_at: DateTime<Utc>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl DataStore {
    /// A store with nothing loaded
    pub fn empty() -> Self {
        Self {
            datasets: BTreeMap::new(),
            summaries: BTreeMap::new(),
            degraded_state: DegradedState::Empty {
                reason: "Nothing loaded".to_string(),
            },
            loaded_at: Utc::now(),
        }
    }

    /// Discover files per `config` and load them
    pub fn discover_and_load(config: &DataConfig) -> (Self, LoadReport) {
        let mut report = LoadReport::new();
        let files = discover(config, &mut report);
        let (store, load_report) = Self::load(files);
        report.merge(load_report);

        let store = Self {
            degraded_state: DegradedState::from_report(&report),
            ..store
        };
        (store, report)
    }

    /// Load raw files into a new store.
    ///
    /// Unrecognized names and undecodable tables are skipped individually
    /// and recorded in the report; the remaining files still load.
    pub fn load(files: impl IntoIterator<Item = RawFile>) -> (Self, LoadReport) {
        let mut report = LoadReport::new();
        let mut datasets = BTreeMap::new();
        let mut summaries = BTreeMap::new();

        for file in files {
            let plan_file = match parse_file_name(&file.name) {
                Ok(plan_file) => plan_file,
                Err(e) => {
                    warn!(file = %file.name, "Skipping file with unrecognized name");
                    report.skip_file(LoadError::warning(&file.name, e.to_string()));
                    continue;
                }
            };

            match plan_file.kind {
                FileKind::Data => {
                    if datasets.contains_key(&plan_file.plan) {
                        warn!(file = %file.name, plan = %plan_file.plan, "Duplicate dataset for plan, keeping first");
                        report.skip_file(LoadError::warning(
                            &file.name,
                            format!("Duplicate dataset for plan {}", plan_file.plan),
                        ));
                        continue;
                    }

                    match decode_price_table(&file.name, &file.bytes) {
                        Ok(decoded) => {
                            note_skipped_rows(&mut report, &file.name, decoded.skipped);
                            debug!(file = %file.name, plan = %plan_file.plan, rows = decoded.rows.len(), "Dataset loaded");
                            let dataset =
                                Dataset::new(plan_file.plan.clone(), plan_file.location, decoded.rows);
                            datasets.insert(plan_file.plan, Arc::new(dataset));
                            report.datasets_loaded += 1;
                        }
                        Err(e) => skip_undecodable(&mut report, &file.name, &e),
                    }
                }
                FileKind::Summary => {
                    if summaries.contains_key(&plan_file.plan) {
                        warn!(file = %file.name, plan = %plan_file.plan, "Duplicate summary for plan, keeping first");
                        report.skip_file(LoadError::warning(
                            &file.name,
                            format!("Duplicate summary table for plan {}", plan_file.plan),
                        ));
                        continue;
                    }

                    match decode_summary_table(&file.name, &file.bytes) {
                        Ok(decoded) => {
                            note_skipped_rows(&mut report, &file.name, decoded.skipped);
                            debug!(file = %file.name, plan = %plan_file.plan, rows = decoded.rows.len(), "Summary table loaded");
                            let table = SummaryTable::new(
                                plan_file.plan.clone(),
                                plan_file.location,
                                decoded.rows,
                            );
                            summaries.insert(plan_file.plan, Arc::new(table));
                            report.summaries_loaded += 1;
                        }
                        Err(e) => skip_undecodable(&mut report, &file.name, &e),
                    }
                }
            }
        }

        let degraded_state = DegradedState::from_report(&report);
        info!(
            datasets = report.datasets_loaded,
            summaries = report.summaries_loaded,
            files_skipped = report.files_skipped,
            rows_skipped = report.rows_skipped,
            state = degraded_state.label(),
            "Data load complete"
        );

        let store = Self {
            datasets,
            summaries,
            degraded_state,
            loaded_at: Utc::now(),
        };
        (store, report)
    }

    // ===================
    // Read accessors
    // ===================

    /// All plans with a dataset, ordered by (insurance, type)
    pub fn list_plans(&self) -> Vec<PlanId> {
        self.datasets.keys().cloned().collect()
    }

    pub fn lookup(&self, plan: &PlanId) -> Result<Arc<Dataset>, CoreError> {
        self.datasets
            .get(plan)
            .cloned()
            .ok_or_else(|| CoreError::MissingDataset {
                plan: plan.to_string(),
            })
    }

    pub fn lookup_summary(&self, plan: &PlanId) -> Option<Arc<SummaryTable>> {
        self.summaries.get(plan).cloned()
    }

    /// Every summary table, ordered by plan
    pub fn summaries(&self) -> impl Iterator<Item = &Arc<SummaryTable>> {
        self.summaries.values()
    }

    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    pub fn summary_count(&self) -> usize {
        self.summaries.len()
    }

    pub fn degraded_state(&self) -> &DegradedState {
        &self.degraded_state
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn note_skipped_rows(report: &mut LoadReport, name: &str, skipped: usize) {
    if skipped > 0 {
        warn!(file = name, skipped, "Skipped undecodable rows");
        report.rows_skipped += skipped;
        report.add_warning(name, format!("Skipped {} undecodable rows", skipped));
    }
}

fn skip_undecodable(report: &mut LoadReport, name: &str, error: &CoreError) {
    warn!(file = name, error = %error, "Skipping undecodable file");
    report.skip_file(LoadError::from_core_error(name, error));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DATA: &str = "procedure_name,billing_code,negotiated_rate,provider_name,provider_npi,city,state,postal_code
MRI Brain,70551,500,A,1,Austin,TX,78705
";
    const SUMMARY: &str = "procedure_name,min,Q1,median,Q3,max\nMRI Brain,300,400,500,600,700\n";

    #[test]
    fn test_empty_store() {
        let store = DataStore::empty();
        assert_eq!(store.dataset_count(), 0);
        assert!(store.list_plans().is_empty());
        assert!(store.degraded_state().is_degraded());
        assert!(matches!(
            store.lookup(&PlanId::new("Aetna", "PPO")),
            Err(CoreError::MissingDataset { .. })
        ));
    }

    #[test]
    fn test_load_indexes_by_plan() {
        let (store, report) = DataStore::load(vec![
            RawFile::new("Austin_Cigna_OAP_data.csv", DATA),
            RawFile::new("Austin_Aetna_PPO_data.csv", DATA),
            RawFile::new("summary_Austin_Aetna_PPO.csv", SUMMARY),
        ]);

        assert_eq!(report.datasets_loaded, 2);
        assert_eq!(report.summaries_loaded, 1);
        assert!(store.degraded_state().is_healthy());
        assert_eq!(
            store.list_plans(),
            vec![PlanId::new("Aetna", "PPO"), PlanId::new("Cigna", "OAP")]
        );
        assert_eq!(store.lookup(&PlanId::new("Aetna", "PPO")).unwrap().len(), 1);
        assert!(store.lookup_summary(&PlanId::new("Aetna", "PPO")).is_some());
        assert!(store.lookup_summary(&PlanId::new("Cigna", "OAP")).is_none());
    }

    #[test]
    fn test_bad_files_do_not_block_good_ones() {
        let (store, report) = DataStore::load(vec![
            RawFile::new("README.csv", "whatever"),
            RawFile::new("Austin_BCBS_Essentials_data.csv", "name,value\nx,1\n"),
            RawFile::new("Austin_Aetna_PPO_data.csv", DATA),
        ]);

        assert_eq!(store.dataset_count(), 1);
        assert_eq!(report.files_skipped, 2);
        assert!(matches!(
            store.degraded_state(),
            DegradedState::PartialData { .. }
        ));
    }

    #[test]
    fn test_duplicate_plan_keeps_first() {
        let second = DATA.replace("500", "900");
        let (store, report) = DataStore::load(vec![
            RawFile::new("Austin_Aetna_PPO_data.csv", DATA),
            RawFile::new("Dallas_Aetna_PPO_data.csv", second),
        ]);

        let dataset = store.lookup(&PlanId::new("Aetna", "PPO")).unwrap();
        assert_eq!(dataset.location, "Austin");
        assert_eq!(dataset.records[0].negotiated_rate, 500.0);
        assert_eq!(report.files_skipped, 1);
    }

    #[test]
    fn test_discover_and_load_from_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Austin_Aetna_PPO_data.csv"), DATA).unwrap();
        std::fs::write(dir.path().join("summary_Austin_Aetna_PPO.csv"), SUMMARY).unwrap();

        let config = DataConfig {
            dir: dir.path().to_path_buf(),
            fallback_dirs: vec![],
            extensions: vec!["csv".to_string()],
        };
        let (store, report) = DataStore::discover_and_load(&config);

        assert_eq!(store.dataset_count(), 1);
        assert_eq!(store.summary_count(), 1);
        assert_eq!(report.source_dir.as_deref(), Some(dir.path()));
        assert!(store.degraded_state().is_healthy());
    }

    #[test]
    fn test_discover_and_load_unavailable_source_starts_empty() {
        let config = DataConfig {
            dir: "/nonexistent/carecost".into(),
            fallback_dirs: vec![],
            extensions: vec!["csv".to_string()],
        };
        let (store, report) = DataStore::discover_and_load(&config);

        assert!(report.has_fatal_errors());
        assert_eq!(store.dataset_count(), 0);
        assert!(matches!(store.degraded_state(), DegradedState::Empty { .. }));
    }
}
