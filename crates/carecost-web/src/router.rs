//! Web router using Axum

use axum::extract::{Query as QueryString, State};
use axum::routing::get;
use axum::{Json, Router};
use carecost_core::models::{PlanId, ProcedureSummary};
use carecost_core::PriceService;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::params::{ProcedureParams, SearchParams, StatsParams};

const MISSING_PARAMETERS: &str = "missing_parameters";

/// Create the web router
pub fn create_router(service: Arc<PriceService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/plans", get(plans_handler))
        .route("/api/procedures", get(procedures_handler))
        .route("/api/search_results", get(search_results_handler))
        .route("/api/stats_data", get(stats_handler))
        .route("/api/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}

async fn plans_handler(State(service): State<Arc<PriceService>>) -> Json<Vec<PlanId>> {
    Json(service.list_plans().await)
}

async fn procedures_handler(
    State(service): State<Arc<PriceService>>,
    QueryString(params): QueryString<ProcedureParams>,
) -> Json<Vec<ProcedureSummary>> {
    let Some(plan) = params.plan() else {
        debug!("Procedure search without a plan");
        return Json(Vec::new());
    };
    let term = params.term.as_deref().unwrap_or("");
    Json(service.search_procedures(&plan, term).await)
}

async fn search_results_handler(
    State(service): State<Arc<PriceService>>,
    QueryString(params): QueryString<SearchParams>,
) -> Json<Value> {
    let Some(query) = params.to_query() else {
        return Json(json!({ "error": MISSING_PARAMETERS, "records": [] }));
    };

    let results = service.search_results(&query).await;
    Json(serde_json::to_value(results).unwrap_or(Value::Null))
}

async fn stats_handler(
    State(service): State<Arc<PriceService>>,
    QueryString(params): QueryString<StatsParams>,
) -> Json<Value> {
    let procedure = params
        .procedure
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    let Some(procedure) = procedure else {
        return Json(json!({ "error": MISSING_PARAMETERS }));
    };

    let stats = service.stats_for(procedure).await;
    Json(serde_json::to_value(stats).unwrap_or(Value::Null))
}

async fn health_handler(State(service): State<Arc<PriceService>>) -> Json<Value> {
    let store = service.store();
    Json(json!({
        "status": store.degraded_state().label(),
        "datasets": store.dataset_count(),
        "summaries": store.summary_count(),
        "loaded_at": store.loaded_at().to_rfc3339(),
        "primary_cache": service.cache().has_primary(),
    }))
}
