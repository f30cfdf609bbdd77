//! Cache-fronted query service
//!
//! Each operation builds a deterministic key, asks the tiered cache, and on a
//! miss computes against the store and writes the answer back. Concurrent
//! misses on the same key may both compute; the writes are identical
//! overwrites.

use crate::aggregator::StatsAggregator;
use crate::cache::{CacheKey, TieredCache};
use crate::config::QueryConfig;
use crate::engine::QueryEngine;
use crate::models::{PlanId, ProcedureSummary, Query, SearchResults, StatsResult};
use crate::store::DataStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hit/miss/compute counters
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
}

impl ServiceMetrics {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }
}

pub struct PriceService {
    engine: QueryEngine,
    stats: StatsAggregator,
    cache: TieredCache,
    metrics: ServiceMetrics,
}

impl PriceService {
    pub fn new(store: Arc<DataStore>, cache: TieredCache, config: &QueryConfig) -> Self {
        Self {
            engine: QueryEngine::new(Arc::clone(&store), config),
            stats: StatsAggregator::new(store),
            cache,
            metrics: ServiceMetrics::default(),
        }
    }

    pub fn store(&self) -> &Arc<DataStore> {
        self.engine.store()
    }

    pub fn cache(&self) -> &TieredCache {
        &self.cache
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    pub async fn list_plans(&self) -> Vec<PlanId> {
        let key = CacheKey::new("list_plans").build();
        self.read_through(&key, || self.engine.list_plans()).await
    }

    pub async fn search_procedures(&self, plan: &PlanId, term: &str) -> Vec<ProcedureSummary> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }

        let key = CacheKey::new("search_procedures")
            .arg(&plan.insurance)
            .arg(&plan.plan_type)
            .arg(term.to_lowercase())
            .build();
        self.read_through(&key, || self.engine.search_procedures(plan, term))
            .await
    }

    pub async fn search_results(&self, query: &Query) -> SearchResults {
        let key = search_results_key(query);
        self.read_through(&key, || self.engine.search_results(query))
            .await
    }

    pub async fn stats_for(&self, procedure: &str) -> StatsResult {
        let key = CacheKey::new("stats_for").arg(procedure).build();
        self.read_through(&key, || self.stats.stats_for(procedure))
            .await
    }

    async fn read_through<T, F>(&self, key: &str, compute: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(cached) = self.cache.get_json::<T>(key).await {
            self.metrics.hits.fetch_add(1, Ordering::Relaxed);
            return cached;
        }

        self.metrics.misses.fetch_add(1, Ordering::Relaxed);
        self.metrics.computations.fetch_add(1, Ordering::Relaxed);
        let value = compute();
        self.cache.set_json(key, &value).await;
        value
    }
}

/// Key covering every query field, with defaults and blanks normalized
pub fn search_results_key(query: &Query) -> String {
    let zipcode = query
        .zipcode
        .as_deref()
        .map(str::trim)
        .filter(|z| !z.is_empty());

    CacheKey::new("search_results")
        .arg(&query.insurance)
        .arg(&query.insurance_type)
        .arg(&query.procedure)
        .opt_arg(zipcode)
        .arg(query.sort_by)
        .opt_arg(query.provider_filter())
        .opt_arg(query.min_price)
        .opt_arg(query.max_price)
        .opt_arg(query.distance)
        .build()
}
