//! carecost - Negotiated procedure price lookup

mod cli;

use anyhow::{Context, Result};
use carecost_core::models::{PlanId, Query, SortBy};
use carecost_core::{export_results_to_csv, CareCostConfig, DataStore, PriceService, TieredCache};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "carecost",
    version,
    about = "Negotiated procedure price lookup",
    long_about = "Loads insurer price-transparency tables and percentile summaries, then\n\
                  answers procedure, provider-rate and statistics lookups from the CLI or\n\
                  over a JSON API, fronted by a shared cache with an in-process fallback.\n\
                  \n\
                  Examples:\n\
                    carecost serve --port 5000                       # Run the JSON API\n\
                    carecost plans                                   # List loaded plans\n\
                    carecost procedures Aetna/PPO mri                # Search procedures\n\
                    carecost search Aetna/PPO \"MRI Brain\" --zipcode 78701 --sort proximity\n\
                    carecost stats \"MRI Brain\" --json                # Percentiles per plan\n\
                  \n\
                  Environment Variables:\n\
                    CARECOST_CONFIG                  # Config file (default: ./carecost.toml)\n\
                    CARECOST_DATA_DIR                # Override data directory\n\
                    CARECOST_REDIS_URL               # Shared cache URL\n\
                    CARECOST_NO_COLOR                # Disable ANSI colors\n\
                    RUST_LOG                         # Log filter (e.g. carecost_core=debug)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Path to config file
    #[arg(long, global = true, env = "CARECOST_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory holding plan tables and summaries
    #[arg(long, global = true, env = "CARECOST_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Shared cache URL (redis://...)
    #[arg(long, global = true, env = "CARECOST_REDIS_URL")]
    redis_url: Option<String>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "CARECOST_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Run the JSON API
    Serve {
        /// Bind address (default from config: 0.0.0.0)
        #[arg(long)]
        host: Option<String>,
        /// Port (default from config: 5000)
        #[arg(long)]
        port: Option<u16>,
    },
    /// List loaded plans
    Plans {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search procedures in a plan by name or billing code
    Procedures {
        /// Plan as Insurer/Type (or Insurer)
        plan: PlanId,
        /// Substring to match (case-insensitive)
        term: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Provider rates for one procedure in a plan
    Search {
        /// Plan as Insurer/Type (or Insurer)
        plan: PlanId,
        /// Exact procedure name
        procedure: String,
        /// Origin zipcode for proximity sort and radius filter
        #[arg(long, short = 'z')]
        zipcode: Option<String>,
        /// Sort order: price|proximity
        #[arg(long, short = 's', default_value = "price")]
        sort: SortBy,
        /// Provider name substring
        #[arg(long, short = 'p')]
        provider: Option<String>,
        /// Minimum negotiated rate (inclusive)
        #[arg(long)]
        min_price: Option<f64>,
        /// Maximum negotiated rate (inclusive)
        #[arg(long)]
        max_price: Option<f64>,
        /// Radius in miles around --zipcode
        #[arg(long, short = 'd')]
        distance: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Also write results to a CSV file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },
    /// Percentile statistics for a procedure across plans
    Stats {
        /// Exact procedure name
        procedure: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.mode {
        Mode::Serve { .. } => "info",
        _ => "warn",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .try_init();

    let mut config =
        CareCostConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data.dir = dir;
    }
    if let Some(url) = cli.redis_url {
        config.cache.redis_url = Some(url);
    }

    let service = build_service(&config).await;
    let no_color = cli.no_color;

    match cli.mode {
        Mode::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            carecost_web::run(Arc::new(service), &host, port, shutdown_signal()).await?;
        }
        Mode::Plans { json } => {
            let plans = service.list_plans().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
            } else {
                cli::print_plans(&plans, no_color);
            }
        }
        Mode::Procedures { plan, term, json } => {
            let procedures = service.search_procedures(&plan, &term).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&procedures)?);
            } else {
                cli::print_procedures(&procedures, no_color);
            }
        }
        Mode::Search {
            plan,
            procedure,
            zipcode,
            sort,
            provider,
            min_price,
            max_price,
            distance,
            json,
            csv,
        } => {
            let mut query = Query::new(&plan, procedure)
                .with_sort(sort)
                .with_price_range(min_price, max_price);
            if let Some(zipcode) = zipcode {
                query = query.with_zipcode(zipcode);
            }
            if let Some(provider) = provider {
                query = query.with_provider(provider);
            }
            if let Some(miles) = distance {
                query = query.with_distance(miles);
            }

            let results = service.search_results(&query).await;
            if let Some(path) = csv {
                export_results_to_csv(&results, &path)?;
                eprintln!("Wrote {} rows to {}", results.records.len(), path.display());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                cli::print_results(&results, no_color);
            }
        }
        Mode::Stats { procedure, json } => {
            let stats = service.stats_for(&procedure).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                cli::print_stats(&procedure, &stats, no_color);
            }
        }
    }

    Ok(())
}

/// Load data and connect the cache tiers
async fn build_service(config: &CareCostConfig) -> PriceService {
    let (store, report) = DataStore::discover_and_load(&config.data);

    if report.has_fatal_errors() {
        eprintln!("Fatal errors during data load:");
        for error in report.errors.iter() {
            eprintln!("  {}: {}", error.source, error.message);
        }
    } else if report.has_errors() {
        let (warnings, errors, _) = report.error_count();
        warn!(
            warnings,
            errors,
            files_skipped = report.files_skipped,
            "Data loaded with problems, some plans may be missing"
        );
    }
    info!(
        datasets = store.dataset_count(),
        summaries = store.summary_count(),
        state = store.degraded_state().label(),
        "Data store ready"
    );

    let cache = TieredCache::from_config(&config.cache).await;
    PriceService::new(Arc::new(store), cache, &config.query)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
