//! Statistics generation from the listings database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::storage::{RunRecord, Storage};
use crate::HarvestError;

/// How many companies and runs the report lists
const TOP_N: usize = 10;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Total number of stored listings
    pub total_listings: u64,

    /// Number of distinct companies
    pub unique_companies: u64,

    /// Companies with the most listings
    pub top_companies: Vec<(String, u64)>,

    /// Most recent runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<HarvestStatistics, HarvestError> {
    Ok(HarvestStatistics {
        total_listings: storage.count_listings()?,
        unique_companies: storage.count_companies()?,
        top_companies: storage.top_companies(TOP_N)?,
        recent_runs: storage.list_runs(TOP_N)?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Total listings: {}", stats.total_listings);
    println!("  Unique companies: {}", stats.unique_companies);
    println!();

    if !stats.top_companies.is_empty() {
        println!("Top Companies:");
        for (company, count) in &stats.top_companies {
            let percentage = if stats.total_listings > 0 {
                (*count as f64 / stats.total_listings as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", company, count, percentage);
        }
        println!();
    }

    if !stats.recent_runs.is_empty() {
        println!("Recent Runs:");
        for run in &stats.recent_runs {
            println!(
                "  #{} {} [{}] \"{}\" ({}, {} pages): {} new, {} duplicates, {} failed pages",
                run.id,
                run.started_at,
                run.status.to_db_string(),
                run.query,
                run.country,
                run.pages,
                run.counts.new_listings,
                run.counts.duplicates,
                run.counts.failed_pages
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::listing::JobListing;
    use crate::storage::SqliteStorage;

    #[test]
    fn test_load_statistics() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run(&SearchConfig::default(), "h").unwrap();
        for (i, company) in ["Acme", "Acme", "Globex"].iter().enumerate() {
            let listing = JobListing {
                title: format!("Job {}", i),
                company: company.to_string(),
                location: "Remote".to_string(),
                summary: String::new(),
                url: format!("u{}", i),
                scraped_at: "2024-05-01T00:00:00Z".to_string(),
            };
            storage.insert_listing(&listing, run_id).unwrap();
        }

        let stats = load_statistics(&storage).unwrap();

        assert_eq!(stats.total_listings, 3);
        assert_eq!(stats.unique_companies, 2);
        assert_eq!(stats.top_companies[0], ("Acme".to_string(), 2));
        assert_eq!(stats.recent_runs.len(), 1);
    }

    #[test]
    fn test_empty_database() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.total_listings, 0);
        assert!(stats.top_companies.is_empty());
        print_statistics(&stats);
    }
}
