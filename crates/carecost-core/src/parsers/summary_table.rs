//! Decoder for percentile summary tables

use super::Decoded;
use crate::error::CoreError;
use crate::models::{Quartiles, SummaryStat};
use serde::Deserialize;
use tracing::debug;

/// Flat on-disk row; csv cannot deserialize flattened structs
#[derive(Debug, Deserialize)]
struct SummaryRow {
    procedure_name: String,
    min: f64,
    #[serde(rename = "Q1", alias = "q1")]
    q1: f64,
    median: f64,
    #[serde(rename = "Q3", alias = "q3")]
    q3: f64,
    max: f64,
}

impl From<SummaryRow> for SummaryStat {
    fn from(row: SummaryRow) -> Self {
        SummaryStat {
            procedure_name: row.procedure_name,
            quartiles: Quartiles {
                min: row.min,
                q1: row.q1,
                median: row.median,
                q3: row.q3,
                max: row.max,
            },
        }
    }
}

/// Decode a CSV summary table (`procedure_name, min, Q1, median, Q3, max`)
pub fn decode_summary_table(name: &str, bytes: &[u8]) -> Result<Decoded<SummaryStat>, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers().map_err(|e| CoreError::FileParse {
        name: name.to_string(),
        message: format!("unreadable header: {}", e),
    })?;

    if !headers.iter().any(|h| h == "procedure_name") {
        return Err(CoreError::FileParse {
            name: name.to_string(),
            message: "missing required column 'procedure_name'".to_string(),
        });
    }

    let mut decoded = Decoded::default();

    for (index, result) in reader.deserialize::<SummaryRow>().enumerate() {
        match result {
            Ok(row) => decoded.rows.push(row.into()),
            Err(e) => {
                debug!(file = name, row = index + 1, error = %e, "Skipping undecodable summary row");
                decoded.skipped += 1;
            }
        }
    }

    if decoded.rows.is_empty() && decoded.skipped > 0 {
        return Err(CoreError::FileParse {
            name: name.to_string(),
            message: format!("none of {} summary rows could be decoded", decoded.skipped),
        });
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_summary() {
        let csv = "procedure_name,min,Q1,median,Q3,max\nMRI Brain,300,400,500,600,700\nCT Head,100,150,200,250,300\n";
        let decoded = decode_summary_table("summary_Austin_Aetna_PPO.csv", csv.as_bytes()).unwrap();
        assert_eq!(decoded.rows.len(), 2);
        assert_eq!(decoded.rows[0].procedure_name, "MRI Brain");
        assert_eq!(decoded.rows[0].quartiles.median, 500.0);
        assert_eq!(decoded.rows[1].quartiles.q3, 250.0);
    }

    #[test]
    fn test_missing_quartile_skips_row() {
        let csv = "procedure_name,min,Q1,median,Q3,max\nMRI Brain,300,,500,600,700\nCT Head,100,150,200,250,300\n";
        let decoded = decode_summary_table("f", csv.as_bytes()).unwrap();
        assert_eq!(decoded.rows.len(), 1);
        assert_eq!(decoded.skipped, 1);
    }

    #[test]
    fn test_wrong_table_shape_fails() {
        let csv = "name,value\nfoo,1\n";
        assert!(decode_summary_table("f", csv.as_bytes()).is_err());
    }
}
