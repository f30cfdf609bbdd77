//! CSV export of search results
//!
//! Columns: Rate, Provider, NPI, Address 1, Address 2, City, State, Postal Code, Zip Distance

use crate::models::SearchResults;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 9] = [
    "Rate",
    "Provider",
    "NPI",
    "Address 1",
    "Address 2",
    "City",
    "State",
    "Postal Code",
    "Zip Distance",
];

/// Write results to `path`, creating parent directories as needed.
///
/// Rows are written in result order. A result carrying an error produces a
/// header-only file.
pub fn export_results_to_csv(results: &SearchResults, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    write_results_csv(results, file)?;
    Ok(())
}

/// Write results as CSV to any writer
pub fn write_results_csv<W: Write>(results: &SearchResults, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER).context("Failed to write CSV header")?;

    for record in &results.records {
        let rate = format!("{:.2}", record.negotiated_rate);
        let distance = record
            .zip_distance
            .map(|d| d.to_string())
            .unwrap_or_default();

        csv.write_record([
            rate.as_str(),
            record.provider_name.as_str(),
            record.provider_npi.as_str(),
            record.address_line_1.as_str(),
            record.address_line_2.as_str(),
            record.city.as_str(),
            record.state.as_str(),
            record.postal_code.as_str(),
            distance.as_str(),
        ])
        .with_context(|| format!("Failed to write row for {}", record.provider_name))?;
    }

    csv.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryErrorKind;
    use crate::models::ProviderRate;
    use tempfile::tempdir;

    fn rate(name: &str, value: f64, distance: Option<u32>) -> ProviderRate {
        ProviderRate {
            negotiated_rate: value,
            provider_name: name.to_string(),
            provider_npi: "1234567890".to_string(),
            address_line_1: "1 Main St".to_string(),
            address_line_2: String::new(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            postal_code: "78705".to_string(),
            zip_distance: distance,
        }
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("results.csv");
        let results = SearchResults::found(vec![
            rate("Austin Imaging", 300.0, Some(3)),
            rate("Smith, Jones & Co", 512.5, None),
        ]);

        export_results_to_csv(&results, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Rate,Provider,NPI"));
        assert_eq!(
            lines[1],
            "300.00,Austin Imaging,1234567890,1 Main St,,Austin,TX,78705,3"
        );
        assert!(lines[2].contains("\"Smith, Jones & Co\""));
        assert!(lines[2].ends_with(",78705,"));
    }

    #[test]
    fn test_failed_result_is_header_only() {
        let mut buffer = Vec::new();
        write_results_csv(&SearchResults::failed(QueryErrorKind::NoResultsFound), &mut buffer)
            .unwrap();
        let content = String::from_utf8(buffer).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
