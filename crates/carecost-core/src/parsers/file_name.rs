//! File-name contract for data and summary tables
//!
//! - data: `<Location>_<InsurerAndType>_data.<ext>`
//! - summary: `summary_<Location>_<InsurerAndType>.<ext>`
//!
//! The summary pattern is tried first so a summary file whose segment
//! happens to end in `_data` is never mistaken for a data file.

use crate::error::CoreError;
use crate::models::{FileKind, PlanFile, PlanId};
use once_cell::sync::Lazy;
use regex::Regex;

static SUMMARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^summary_([^_]+)_(.+)\.[A-Za-z0-9]+$").expect("summary pattern is valid")
});

static DATA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^_]+)_(.+)_data\.[A-Za-z0-9]+$").expect("data pattern is valid")
});

/// Parse a bare file name (no directory) into its plan descriptor
pub fn parse_file_name(name: &str) -> Result<PlanFile, CoreError> {
    if let Some(caps) = SUMMARY_RE.captures(name) {
        return Ok(PlanFile {
            kind: FileKind::Summary,
            location: caps[1].to_string(),
            plan: PlanId::from_segment(&caps[2]),
        });
    }

    if let Some(caps) = DATA_RE.captures(name) {
        return Ok(PlanFile {
            kind: FileKind::Data,
            location: caps[1].to_string(),
            plan: PlanId::from_segment(&caps[2]),
        });
    }

    Err(CoreError::FileParse {
        name: name.to_string(),
        message: "name matches neither <Location>_<Plan>_data.<ext> nor summary_<Location>_<Plan>.<ext>"
            .to_string(),
    })
}
