//! Plan identifiers and file descriptors
//!
//! A [`PlanId`] names one insurer/coverage-type dataset. It is written as
//! `Insurer/Type` (or just `Insurer` when the type is opaque) wherever it
//! crosses a text boundary: CLI arguments, JSON maps, cache keys.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Composite key naming one priced dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanId {
    pub insurance: String,
    pub plan_type: String,
}

impl PlanId {
    pub fn new(insurance: impl Into<String>, plan_type: impl Into<String>) -> Self {
        Self {
            insurance: insurance.into(),
            plan_type: plan_type.into(),
        }
    }

    /// Split an `<InsurerAndType>` file-name segment at its first underscore.
    ///
    /// `UHC_Options_PPO` becomes `(UHC, Options_PPO)`; a single token such as
    /// `Cigna` becomes `(Cigna, "")`.
    pub fn from_segment(segment: &str) -> Self {
        match segment.split_once('_') {
            Some((insurance, plan_type)) => Self::new(insurance, plan_type),
            None => Self::new(segment, ""),
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.plan_type.is_empty() {
            write!(f, "{}", self.insurance)
        } else {
            write!(f, "{}/{}", self.insurance, self.plan_type)
        }
    }
}

impl FromStr for PlanId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("plan must not be empty".to_string());
        }
        Ok(match s.split_once('/') {
            Some((insurance, plan_type)) => Self::new(insurance.trim(), plan_type.trim()),
            None => Self::new(s, ""),
        })
    }
}

impl Serialize for PlanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlanId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which table family a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `<Location>_<InsurerAndType>_data.<ext>`
    Data,
    /// `summary_<Location>_<InsurerAndType>.<ext>`
    Summary,
}

/// Result of parsing a data file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanFile {
    pub kind: FileKind,
    pub location: String,
    pub plan: PlanId,
}
