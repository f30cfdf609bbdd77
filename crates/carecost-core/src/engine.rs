//! Filtering, projection and sorting over loaded datasets
//!
//! Every answer is a filtered, sorted copy; datasets are never mutated.
//! Sorting is stable, so rows with equal keys keep their file order.

use crate::config::QueryConfig;
use crate::distance::{within_radius, zip_distance};
use crate::error::{CoreError, QueryErrorKind};
use crate::models::{PlanId, PriceRecord, ProcedureSummary, ProviderRate, Query, SearchResults, SortBy};
use crate::store::DataStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub struct QueryEngine {
    store: Arc<DataStore>,
    zip_delta_per_mile: f64,
}

impl QueryEngine {
    pub fn new(store: Arc<DataStore>, config: &QueryConfig) -> Self {
        Self {
            store,
            zip_delta_per_mile: config.zip_delta_per_mile,
        }
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    pub fn list_plans(&self) -> Vec<PlanId> {
        self.store.list_plans()
    }

    /// Distinct `(procedure_name, billing_code)` pairs where `term` is a
    /// case-insensitive substring of either field, in first-seen order.
    ///
    /// A blank term or unknown plan yields an empty list.
    pub fn search_procedures(&self, plan: &PlanId, term: &str) -> Vec<ProcedureSummary> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }

        let Ok(dataset) = self.store.lookup(plan) else {
            debug!(plan = %plan, "Procedure search on unknown plan");
            return Vec::new();
        };

        let needle = term.to_lowercase();
        let mut seen = HashSet::new();
        let mut procedures = Vec::new();

        for record in &dataset.records {
            let matches = record.procedure_name.to_lowercase().contains(&needle)
                || record.billing_code.to_lowercase().contains(&needle);
            if !matches {
                continue;
            }

            let key = (record.procedure_name.as_str(), record.billing_code.as_str());
            if seen.insert(key) {
                procedures.push(ProcedureSummary {
                    procedure_name: record.procedure_name.clone(),
                    billing_code: record.billing_code.clone(),
                });
            }
        }

        procedures
    }

    /// Priced providers for one exact procedure name.
    ///
    /// Filters apply in order: provider substring, price range, radius.
    pub fn search_results(&self, query: &Query) -> SearchResults {
        match self.try_search_results(query) {
            Ok(records) => SearchResults::found(records),
            Err(e) => {
                debug!(error = %e, "Search produced no answer");
                match e.query_kind() {
                    Some(kind) => SearchResults::failed(kind),
                    None => SearchResults::failed(QueryErrorKind::NoResultsFound),
                }
            }
        }
    }

    fn try_search_results(&self, query: &Query) -> Result<Vec<ProviderRate>, CoreError> {
        let plan = query.plan();
        let dataset = self.store.lookup(&plan)?;

        let mut rows: Vec<&PriceRecord> = dataset
            .records
            .iter()
            .filter(|r| r.procedure_name == query.procedure)
            .collect();

        if let Some(provider) = query.provider_filter() {
            let needle = provider.to_lowercase();
            rows.retain(|r| r.provider_name.to_lowercase().contains(&needle));
        }

        let min_price = usable_amount("min_price", query.min_price);
        let max_price = usable_amount("max_price", query.max_price);
        if min_price.is_some() || max_price.is_some() {
            let min = min_price.unwrap_or(f64::NEG_INFINITY);
            let max = max_price.unwrap_or(f64::INFINITY);
            rows.retain(|r| r.negotiated_rate >= min && r.negotiated_rate <= max);
        }

        let origin = self.origin_zip(query);

        if let Some(miles) = usable_amount("distance", query.distance) {
            match origin {
                Some(origin) => rows.retain(|r| {
                    r.zip5()
                        .map(|z| within_radius(zip_distance(z, origin), miles, self.zip_delta_per_mile))
                        .unwrap_or(false)
                }),
                None => debug!(miles, "Radius filter ignored without a valid zipcode"),
            }
        }

        if rows.is_empty() {
            return Err(CoreError::NoResultsFound {
                plan: plan.to_string(),
                procedure: query.procedure.clone(),
            });
        }

        let mut ranked: Vec<(&PriceRecord, Option<u32>)> = rows
            .into_iter()
            .map(|r| (r, origin.and_then(|o| r.zip5().map(|z| zip_distance(z, o)))))
            .collect();

        let by_proximity = query.sort_by == SortBy::Proximity
            && origin.is_some()
            && ranked.iter().all(|(_, d)| d.is_some());

        if by_proximity {
            ranked.sort_by_key(|(_, d)| *d);
        } else {
            if query.sort_by == SortBy::Proximity {
                debug!("Proximity sort unavailable, falling back to price");
            }
            ranked.sort_by(|(a, _), (b, _)| a.negotiated_rate.total_cmp(&b.negotiated_rate));
        }

        Ok(ranked
            .into_iter()
            .map(|(r, d)| ProviderRate::project(r, d))
            .collect())
    }

    /// Query zipcode as an integer; a malformed one is absorbed as absent
    fn origin_zip(&self, query: &Query) -> Option<u32> {
        let zipcode = query.zipcode.as_deref().map(str::trim).filter(|z| !z.is_empty())?;
        let parsed = query.zip5();
        if parsed.is_none() {
            let err = CoreError::MalformedInput {
                field: "zipcode",
                value: zipcode.to_string(),
            };
            debug!(error = %err, "Ignoring zipcode");
        }
        parsed
    }
}

/// A price bound or radius; NaN, infinite and negative values count as absent
fn usable_amount(field: &'static str, value: Option<f64>) -> Option<f64> {
    let value = value?;
    if value.is_finite() && value >= 0.0 {
        return Some(value);
    }
    let err = CoreError::MalformedInput {
        field,
        value: value.to_string(),
    };
    debug!(error = %err, "Ignoring filter");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::RawFile;

    const DATA: &str = "procedure_name,billing_code,negotiated_rate,provider_name,provider_npi,address_line_1,address_line_2,city,state,postal_code
MRI Brain,70551,500,Austin Imaging,1,1 Main,,Austin,TX,78705
MRI Brain,70551,700,Capital Radiology,2,2 Oak,,Austin,TX,78701
MRI Brain,70551,300,Hill Country Hospital,3,3 Elm,,Round Rock,TX,78664
CT Head,70450,200,Austin Imaging,1,1 Main,,Austin,TX,78705
MRI Brain w/ contrast,70552,900,Austin Imaging,1,1 Main,,Austin,TX,78705
CT Head,70450,250,Capital Radiology,2,2 Oak,,Austin,TX,78701
";

    fn engine() -> QueryEngine {
        let (store, _) = DataStore::load(vec![RawFile::new("Austin_Aetna_PPO_data.csv", DATA)]);
        QueryEngine::new(Arc::new(store), &QueryConfig::default())
    }

    fn plan() -> PlanId {
        PlanId::new("Aetna", "PPO")
    }

    fn rates(results: &SearchResults) -> Vec<f64> {
        results.records.iter().map(|r| r.negotiated_rate).collect()
    }

    #[test]
    fn test_search_procedures_blank_term_is_empty() {
        let engine = engine();
        assert!(engine.search_procedures(&plan(), "").is_empty());
        assert!(engine.search_procedures(&plan(), "   ").is_empty());
    }

    #[test]
    fn test_search_procedures_dedups_and_matches_code() {
        let engine = engine();
        let found = engine.search_procedures(&plan(), "mri");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].procedure_name, "MRI Brain");
        assert_eq!(found[1].billing_code, "70552");

        let by_code = engine.search_procedures(&plan(), "7045");
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].procedure_name, "CT Head");
    }

    #[test]
    fn test_search_procedures_unknown_plan_is_empty() {
        assert!(engine()
            .search_procedures(&PlanId::new("Unknown", ""), "mri")
            .is_empty());
    }

    #[test]
    fn test_price_sort_scenario() {
        let results = engine().search_results(&Query::new(&plan(), "MRI Brain"));
        assert!(results.is_ok());
        assert_eq!(rates(&results), vec![300.0, 500.0, 700.0]);
    }

    #[test]
    fn test_exact_procedure_match() {
        let results = engine().search_results(&Query::new(&plan(), "MRI Brain"));
        assert!(results
            .records
            .iter()
            .all(|r| r.negotiated_rate != 900.0));

        let lower = engine().search_results(&Query::new(&plan(), "mri brain"));
        assert_eq!(lower.error, Some(QueryErrorKind::NoResultsFound));
        assert!(lower.records.is_empty());
    }

    #[test]
    fn test_unknown_plan_is_missing_dataset() {
        let results = engine().search_results(&Query::new(&PlanId::new("Unknown", ""), "MRI Brain"));
        assert_eq!(results.error, Some(QueryErrorKind::MissingDataset));
        assert!(results.records.is_empty());
    }

    #[test]
    fn test_proximity_sort() {
        let query = Query::new(&plan(), "MRI Brain")
            .with_zipcode("78702")
            .with_sort(SortBy::Proximity);
        let results = engine().search_results(&query);

        let distances: Vec<_> = results.records.iter().map(|r| r.zip_distance).collect();
        assert_eq!(distances, vec![Some(1), Some(3), Some(38)]);
        assert_eq!(rates(&results), vec![700.0, 500.0, 300.0]);
    }

    #[test]
    fn test_proximity_without_valid_zip_falls_back_to_price() {
        let engine = engine();
        let by_price = engine.search_results(&Query::new(&plan(), "MRI Brain"));

        for zip in [None, Some("abcde"), Some("")] {
            let mut query = Query::new(&plan(), "MRI Brain").with_sort(SortBy::Proximity);
            query.zipcode = zip.map(str::to_string);
            let results = engine.search_results(&query);
            assert_eq!(rates(&results), rates(&by_price));
        }
    }

    #[test]
    fn test_proximity_with_unparseable_postal_code_falls_back() {
        let data = format!("{}MRI Brain,70551,100,Mobile Unit,4,,,Austin,TX,TBD\n", DATA);
        let (store, _) = DataStore::load(vec![RawFile::new("Austin_Aetna_PPO_data.csv", data)]);
        let engine = QueryEngine::new(Arc::new(store), &QueryConfig::default());

        let query = Query::new(&plan(), "MRI Brain")
            .with_zipcode("78702")
            .with_sort(SortBy::Proximity);
        let results = engine.search_results(&query);
        assert_eq!(rates(&results), vec![100.0, 300.0, 500.0, 700.0]);
    }

    #[test]
    fn test_provider_filter_is_case_insensitive() {
        let query = Query::new(&plan(), "MRI Brain").with_provider("radiology");
        let results = engine().search_results(&query);
        assert_eq!(results.records.len(), 1);
        assert_eq!(results.records[0].provider_name, "Capital Radiology");
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let query = Query::new(&plan(), "MRI Brain").with_price_range(Some(300.0), Some(500.0));
        assert_eq!(rates(&engine().search_results(&query)), vec![300.0, 500.0]);

        let query = Query::new(&plan(), "MRI Brain").with_price_range(Some(600.0), None);
        assert_eq!(rates(&engine().search_results(&query)), vec![700.0]);

        let query = Query::new(&plan(), "MRI Brain").with_price_range(None, Some(100.0));
        let results = engine().search_results(&query);
        assert_eq!(results.error, Some(QueryErrorKind::NoResultsFound));
    }

    #[test]
    fn test_radius_filter() {
        // 20 miles -> zip delta 4
        let query = Query::new(&plan(), "MRI Brain")
            .with_zipcode("78702")
            .with_distance(20.0);
        let results = engine().search_results(&query);
        assert_eq!(rates(&results), vec![500.0, 700.0]);
    }

    #[test]
    fn test_radius_ignored_without_zipcode() {
        let query = Query::new(&plan(), "MRI Brain").with_distance(1.0);
        assert_eq!(engine().search_results(&query).records.len(), 3);
    }

    #[test]
    fn test_stable_tie_break_preserves_file_order() {
        let data = "procedure_name,billing_code,negotiated_rate,provider_name,provider_npi,postal_code
X,1,100,First,1,78701
X,1,50,Cheap,2,78701
X,1,100,Second,3,78701
X,1,100,Third,4,78701
";
        let (store, _) = DataStore::load(vec![RawFile::new("Austin_Aetna_PPO_data.csv", data)]);
        let engine = QueryEngine::new(Arc::new(store), &QueryConfig::default());

        let names: Vec<_> = engine
            .search_results(&Query::new(&plan(), "X"))
            .records
            .into_iter()
            .map(|r| r.provider_name)
            .collect();
        assert_eq!(names, vec!["Cheap", "First", "Second", "Third"]);

        let query = Query::new(&plan(), "X")
            .with_zipcode("78701")
            .with_sort(SortBy::Proximity);
        let names: Vec<_> = engine
            .search_results(&query)
            .records
            .into_iter()
            .map(|r| r.provider_name)
            .collect();
        assert_eq!(names, vec!["First", "Cheap", "Second", "Third"]);
    }
    #[test]
    fn test_non_finite_or_negative_bounds_are_ignored() {
        let unfiltered = rates(&engine().search_results(&Query::new(&plan(), "MRI Brain")));

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -1.0] {
            let query = Query::new(&plan(), "MRI Brain").with_price_range(Some(bad), None);
            assert_eq!(rates(&engine().search_results(&query)), unfiltered);

            let query = Query::new(&plan(), "MRI Brain").with_price_range(None, Some(bad));
            assert_eq!(rates(&engine().search_results(&query)), unfiltered);

            let query = Query::new(&plan(), "MRI Brain")
                .with_zipcode("78702")
                .with_distance(bad);
            assert_eq!(rates(&engine().search_results(&query)), unfiltered);
        }

        let query = Query::new(&plan(), "MRI Brain").with_price_range(Some(f64::NAN), Some(500.0));
        assert_eq!(rates(&engine().search_results(&query)), vec![300.0, 500.0]);
    }

    #[test]
    fn test_radius_drops_unparseable_postal_codes() {
        let data = format!("{}MRI Brain,70551,100,Mobile Unit,4,,,Austin,TX,TBD\n", DATA);
        let (store, _) = DataStore::load(vec![RawFile::new("Austin_Aetna_PPO_data.csv", data)]);
        let engine = QueryEngine::new(Arc::new(store), &QueryConfig::default());

        let without_radius = engine.search_results(&Query::new(&plan(), "MRI Brain").with_zipcode("78702"));
        assert_eq!(rates(&without_radius), vec![100.0, 300.0, 500.0, 700.0]);

        let query = Query::new(&plan(), "MRI Brain")
            .with_zipcode("78702")
            .with_distance(1_000.0);
        let results = engine.search_results(&query);
        assert_eq!(rates(&results), vec![300.0, 500.0, 700.0]);
        assert!(results.records.iter().all(|r| r.provider_name != "Mobile Unit"));
    }
}
