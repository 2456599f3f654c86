//! Output module for harvested listings and reports
//!
//! This module handles:
//! - Appending listings to the CSV file
//! - The end-of-run summary line
//! - Statistics read back from the database

mod csv_sink;
pub mod stats;
mod summary;

pub use csv_sink::{read_listings, CsvSink, CSV_HEADER};
pub use stats::{load_statistics, print_statistics, HarvestStatistics};
pub use summary::RunSummary;
