//! Parsers for data file names and tabular contents

pub mod file_name;
pub mod price_table;
pub mod summary_table;

pub use file_name::parse_file_name;
pub use price_table::decode_price_table;
pub use summary_table::decode_summary_table;

/// Rows decoded from one table plus the count of rows that were dropped
#[derive(Debug)]
pub struct Decoded<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            skipped: 0,
        }
    }
}
