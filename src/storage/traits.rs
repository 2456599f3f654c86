//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::config::SearchConfig;
use crate::listing::{DedupKey, JobListing};
use crate::storage::{RunCounts, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The coordinator owns a single backend for the whole run; no method is
/// expected to be called concurrently.
pub trait Storage {
    // ===== Run Management =====

    /// Records the start of a run and returns its ID
    fn create_run(&mut self, search: &SearchConfig, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Gets the most recent runs, newest first
    fn list_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;

    /// Stamps the finish time, final status and counters of a run
    fn finish_run(&mut self, run_id: i64, status: RunStatus, counts: &RunCounts)
        -> StorageResult<()>;

    // ===== Page Batches =====

    /// Opens a batch; listing inserts stay invisible until it is committed
    fn begin_batch(&mut self) -> StorageResult<()>;

    /// Makes every insert since [`Storage::begin_batch`] durable
    fn commit_batch(&mut self) -> StorageResult<()>;

    /// Discards every insert since [`Storage::begin_batch`]
    fn rollback_batch(&mut self) -> StorageResult<()>;

    // ===== Listings =====

    /// Inserts a listing unless its dedup key is already stored
    ///
    /// # Returns
    ///
    /// `true` if a row was written, `false` if the key already existed
    fn insert_listing(&mut self, listing: &JobListing, run_id: i64) -> StorageResult<bool>;

    /// Loads the dedup keys of every stored listing
    fn load_dedup_keys(&self) -> StorageResult<Vec<DedupKey>>;

    /// Gets all stored listings in insertion order
    fn get_listings(&self) -> StorageResult<Vec<JobListing>>;

    // ===== Statistics =====

    /// Gets total listing count
    fn count_listings(&self) -> StorageResult<u64>;

    /// Gets count of distinct companies across all listings
    fn count_companies(&self) -> StorageResult<u64>;

    /// Gets the companies with the most listings, most first
    fn top_companies(&self, limit: usize) -> StorageResult<Vec<(String, u64)>>;
}
