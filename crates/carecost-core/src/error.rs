//! Error types for carecost-core
//!
//! Load-time failures are collected into a [`LoadReport`] so the store can
//! start degraded instead of aborting. Query-time "no answer" conditions are
//! returned as [`QueryErrorKind`] values inside result objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for carecost operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Query Errors
    // ===================
    #[error("No dataset loaded for plan {plan}")]
    MissingDataset { plan: String },

    #[error("No results found for procedure '{procedure}' in plan {plan}")]
    NoResultsFound { plan: String, procedure: String },

    #[error("No statistics available for procedure '{procedure}'")]
    NoStatisticsAvailable { procedure: String },

    #[error("Malformed {field}: '{value}'")]
    MalformedInput { field: &'static str, value: String },

    // ===================
    // Load Errors
    // ===================
    #[error("Failed to parse {name}: {message}")]
    FileParse { name: String, message: String },

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    // ===================
    // Cache Errors
    // ===================
    #[error("Cache tier '{tier}' unavailable: {message}")]
    CacheUnavailable { tier: String, message: String },

    #[error("Failed to (de)serialize cached value: {0}")]
    Serialization(#[from] serde_json::Error),

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CoreError {
    /// Structured kind for errors that are surfaced to callers as result fields
    pub fn query_kind(&self) -> Option<QueryErrorKind> {
        match self {
            CoreError::MissingDataset { .. } => Some(QueryErrorKind::MissingDataset),
            CoreError::NoResultsFound { .. } => Some(QueryErrorKind::NoResultsFound),
            CoreError::NoStatisticsAvailable { .. } => Some(QueryErrorKind::NoStatisticsAvailable),
            _ => None,
        }
    }
}

/// Non-fatal "no answer" conditions returned inside query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryErrorKind {
    /// Unknown plan/type at query time
    MissingDataset,
    /// Dataset exists but no row matched
    NoResultsFound,
    /// No summary table carries the procedure
    NoStatisticsAvailable,
}

impl QueryErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryErrorKind::MissingDataset => "missing_dataset",
            QueryErrorKind::NoResultsFound => "no_results_found",
            QueryErrorKind::NoStatisticsAvailable => "no_statistics_available",
        }
    }

    /// Human-readable message for renderers
    pub fn message(&self) -> &'static str {
        match self {
            QueryErrorKind::MissingDataset => "No data available for the selected plan",
            QueryErrorKind::NoResultsFound => "No results found for this procedure",
            QueryErrorKind::NoStatisticsAvailable => "No statistics available for this procedure",
        }
    }
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level for errors during load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Non-critical, can continue with degraded functionality
    Warning,
    /// Significant but not fatal
    Error,
    /// Data source exhausted
    Fatal,
}

/// Individual error entry in load report
#[derive(Debug, Clone)]
pub struct LoadError {
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
}

impl LoadError {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
        }
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Error,
        }
    }

    pub fn fatal(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Fatal,
        }
    }

    pub fn from_core_error(source: impl Into<String>, error: &CoreError) -> Self {
        Self::error(source, error.to_string())
    }
}

/// Report of errors encountered during data loading
///
/// Tracks partial failures so one bad file never aborts the whole load.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<LoadError>,
    pub datasets_loaded: usize,
    pub summaries_loaded: usize,
    pub files_skipped: usize,
    pub rows_skipped: usize,
    /// Directory the files were discovered in, if any
    pub source_dir: Option<PathBuf>,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: LoadError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::warning(source, message));
    }

    pub fn add_fatal(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::fatal(source, message));
    }

    /// Record a file that was not loaded
    pub fn skip_file(&mut self, error: LoadError) {
        self.files_skipped += 1;
        self.errors.push(error);
    }

    pub fn has_fatal_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity == ErrorSeverity::Fatal)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LoadError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ErrorSeverity::Warning)
    }

    /// Returns count by severity: (warnings, errors, fatal)
    pub fn error_count(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for e in &self.errors {
            match e.severity {
                ErrorSeverity::Warning => counts.0 += 1,
                ErrorSeverity::Error => counts.1 += 1,
                ErrorSeverity::Fatal => counts.2 += 1,
            }
        }
        counts
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: LoadReport) {
        self.errors.extend(other.errors);
        self.datasets_loaded += other.datasets_loaded;
        self.summaries_loaded += other.summaries_loaded;
        self.files_skipped += other.files_skipped;
        self.rows_skipped += other.rows_skipped;
        if self.source_dir.is_none() {
            self.source_dir = other.source_dir;
        }
    }
}

/// Degraded state indicator for the data store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradedState {
    /// Every discovered file loaded
    Healthy,
    /// Some files or rows were skipped but data is available
    PartialData { skipped: usize, reason: String },
    /// Nothing loaded; every query degrades to MissingDataset
    Empty { reason: String },
}

impl DegradedState {
    pub fn from_report(report: &LoadReport) -> Self {
        if report.datasets_loaded == 0 && report.summaries_loaded == 0 {
            let reason = if report.has_fatal_errors() {
                "All data sources unavailable".to_string()
            } else {
                "No valid data files found".to_string()
            };
            return DegradedState::Empty { reason };
        }

        if report.files_skipped > 0 || report.rows_skipped > 0 {
            return DegradedState::PartialData {
                skipped: report.files_skipped,
                reason: format!(
                    "Skipped {} files and {} rows",
                    report.files_skipped, report.rows_skipped
                ),
            };
        }

        DegradedState::Healthy
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, DegradedState::Healthy)
    }

    pub fn is_degraded(&self) -> bool {
        !self.is_healthy()
    }

    pub fn label(&self) -> &'static str {
        match self {
            DegradedState::Healthy => "healthy",
            DegradedState::PartialData { .. } => "degraded",
            DegradedState::Empty { .. } => "empty",
        }
    }
}
