//! Decoder for negotiated-rate data tables

use super::Decoded;
use crate::error::CoreError;
use crate::models::PriceRecord;
use tracing::debug;

/// Decode a CSV data table into price records, preserving row order.
///
/// Rows that fail to decode or carry a negative rate are skipped and counted.
/// A missing required header, or a file where every row is bad, fails the
/// whole file.
pub fn decode_price_table(name: &str, bytes: &[u8]) -> Result<Decoded<PriceRecord>, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().map_err(|e| CoreError::FileParse {
        name: name.to_string(),
        message: format!("unreadable header: {}", e),
    })?;

    for required in ["procedure_name", "billing_code", "negotiated_rate"] {
        if !headers.iter().any(|h| h == required) {
            return Err(CoreError::FileParse {
                name: name.to_string(),
                message: format!("missing required column '{}'", required),
            });
        }
    }

    let mut decoded = Decoded::default();

    for (index, result) in reader.deserialize::<PriceRecord>().enumerate() {
        match result {
            Ok(record) if record.negotiated_rate >= 0.0 && record.negotiated_rate.is_finite() => {
                decoded.rows.push(record);
            }
            Ok(record) => {
                debug!(file = name, row = index + 1, rate = record.negotiated_rate, "Skipping row with invalid rate");
                decoded.skipped += 1;
            }
            Err(e) => {
                debug!(file = name, row = index + 1, error = %e, "Skipping undecodable row");
                decoded.skipped += 1;
            }
        }
    }

    if decoded.rows.is_empty() && decoded.skipped > 0 {
        return Err(CoreError::FileParse {
            name: name.to_string(),
            message: format!("none of {} rows could be decoded", decoded.skipped),
        });
    }

    Ok(decoded)
}
