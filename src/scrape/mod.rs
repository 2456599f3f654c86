//! Scrape module: fetching, extraction and the run loop
//!
//! This module contains the core harvesting logic, including:
//! - Fetching result pages through the scraping proxy
//! - Extracting job cards from the returned HTML
//! - The sequential run loop that deduplicates and persists listings

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_harvest, Coordinator};
pub use fetcher::{build_http_client, fetch_page, ProxyClient};
pub use parser::{parse_jobs, parse_jobs_at, JobSelectors};
