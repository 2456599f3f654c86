//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::config::SearchConfig;
use crate::listing::{DedupKey, JobListing};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunCounts, RunRecord, RunStatus};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, query, country, pages, config_hash, \
                           status, new_listings, duplicates, failed_pages";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// The file and the schema are created if absent.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        query: row.get(3)?,
        country: row.get(4)?,
        pages: row.get(5)?,
        config_hash: row.get(6)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(7)?).unwrap_or(RunStatus::Failed),
        counts: RunCounts {
            new_listings: row.get::<_, i64>(8)? as u64,
            duplicates: row.get::<_, i64>(9)? as u64,
            failed_pages: row.get(10)?,
        },
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, search: &SearchConfig, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, query, country, pages, config_hash, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                now,
                search.query,
                search.country,
                search.pages,
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn list_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;
        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counts: &RunCounts,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, new_listings = ?3,
             duplicates = ?4, failed_pages = ?5 WHERE id = ?6",
            params![
                status.to_db_string(),
                now,
                counts.new_listings as i64,
                counts.duplicates as i64,
                counts.failed_pages,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Page Batches =====

    fn begin_batch(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit_batch(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback_batch(&mut self) -> StorageResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    // ===== Listings =====

    fn insert_listing(&mut self, listing: &JobListing, run_id: i64) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO jobs (title, company, location, summary, url, scraped_at, run_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                listing.title,
                listing.company,
                listing.location,
                listing.summary,
                listing.url,
                listing.scraped_at,
                run_id
            ],
        )?;
        Ok(inserted == 1)
    }

    fn load_dedup_keys(&self) -> StorageResult<Vec<DedupKey>> {
        let mut stmt = self.conn.prepare("SELECT title, company, url FROM jobs")?;
        let keys = stmt
            .query_map([], |row| {
                Ok(DedupKey {
                    title: row.get(0)?,
                    company: row.get(1)?,
                    url: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn get_listings(&self) -> StorageResult<Vec<JobListing>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, company, location, summary, url, scraped_at FROM jobs ORDER BY id",
        )?;
        let listings = stmt
            .query_map([], |row| {
                Ok(JobListing {
                    title: row.get(0)?,
                    company: row.get(1)?,
                    location: row.get(2)?,
                    summary: row.get(3)?,
                    url: row.get(4)?,
                    scraped_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(listings)
    }

    // ===== Statistics =====

    fn count_listings(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_companies(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT company) FROM jobs", [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }

    fn top_companies(&self, limit: usize) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT company, COUNT(*) AS n FROM jobs GROUP BY company
             ORDER BY n DESC, company ASC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    fn listing(title: &str, company: &str, url: &str) -> JobListing {
        JobListing {
            title: title.to_string(),
            company: company.to_string(),
            location: "Remote".to_string(),
            summary: "Process payroll".to_string(),
            url: url.to_string(),
            scraped_at: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_create_in_memory() {
        let storage = SqliteStorage::new_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_create_and_get_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage
            .create_run(&SearchConfig::default(), "test_hash")
            .unwrap();
        assert!(run_id > 0);

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.country, "us");
        assert_eq!(run.pages, 3);
        assert!(run.finished_at.is_none());
    }

    #[test]
    fn test_get_missing_run() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.get_run(42),
            Err(StorageError::RunNotFound(42))
        ));
    }

    #[test]
    fn test_finish_run_records_counts() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage
            .create_run(&SearchConfig::default(), "test_hash")
            .unwrap();

        let counts = RunCounts {
            new_listings: 7,
            duplicates: 2,
            failed_pages: 1,
        };
        storage
            .finish_run(run_id, RunStatus::Completed, &counts)
            .unwrap();

        let run = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.counts, counts);
        assert!(run.finished_at.is_some());
    }

    #[test]
    fn test_list_runs_newest_first() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let first = storage.create_run(&SearchConfig::default(), "a").unwrap();
        let second = storage.create_run(&SearchConfig::default(), "b").unwrap();

        let runs = storage.list_runs(10).unwrap();
        assert_eq!(runs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second, first]);
        assert_eq!(storage.list_runs(1).unwrap().len(), 1);
    }

    #[test]
    fn test_insert_listing() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run(&SearchConfig::default(), "h").unwrap();

        assert!(storage
            .insert_listing(&listing("Clerk", "Acme", "u1"), run_id)
            .unwrap());
        assert_eq!(storage.count_listings().unwrap(), 1);
        assert_eq!(storage.get_listings().unwrap()[0], listing("Clerk", "Acme", "u1"));
    }

    #[test]
    fn test_insert_duplicate_listing_is_ignored() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run(&SearchConfig::default(), "h").unwrap();

        storage
            .insert_listing(&listing("Clerk", "Acme", "u1"), run_id)
            .unwrap();
        let mut again = listing("Clerk", "Acme", "u1");
        again.location = "Elsewhere".to_string();

        assert!(!storage.insert_listing(&again, run_id).unwrap());
        assert_eq!(storage.count_listings().unwrap(), 1);
    }

    #[test]
    fn test_rolled_back_batch_leaves_no_rows() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run(&SearchConfig::default(), "h").unwrap();

        storage.begin_batch().unwrap();
        storage
            .insert_listing(&listing("Clerk", "Acme", "u1"), run_id)
            .unwrap();
        storage.rollback_batch().unwrap();

        assert_eq!(storage.count_listings().unwrap(), 0);
        assert!(storage.load_dedup_keys().unwrap().is_empty());

        storage.begin_batch().unwrap();
        storage
            .insert_listing(&listing("Clerk", "Acme", "u1"), run_id)
            .unwrap();
        storage.commit_batch().unwrap();

        assert_eq!(storage.count_listings().unwrap(), 1);
        // Nothing open any more, so this is a no-op
        storage.rollback_batch().unwrap();
        assert_eq!(storage.count_listings().unwrap(), 1);
    }

    #[test]
    fn test_load_dedup_keys() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run(&SearchConfig::default(), "h").unwrap();
        storage
            .insert_listing(&listing("Clerk", "Acme", "u1"), run_id)
            .unwrap();
        storage
            .insert_listing(&listing("Analyst", "Globex", "u2"), run_id)
            .unwrap();

        let mut keys = storage.load_dedup_keys().unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                DedupKey::new("Analyst", "Globex", "u2"),
                DedupKey::new("Clerk", "Acme", "u1"),
            ]
        );
    }

    #[test]
    fn test_company_statistics() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run(&SearchConfig::default(), "h").unwrap();
        for (title, company, url) in [
            ("Clerk", "Acme", "u1"),
            ("Analyst", "Acme", "u2"),
            ("Manager", "Globex", "u3"),
        ] {
            storage
                .insert_listing(&listing(title, company, url), run_id)
                .unwrap();
        }

        assert_eq!(storage.count_companies().unwrap(), 2);
        assert_eq!(
            storage.top_companies(5).unwrap(),
            vec![("Acme".to_string(), 2), ("Globex".to_string(), 1)]
        );
    }

    #[test]
    fn test_reopen_file_database_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.db");

        {
            let mut storage = SqliteStorage::new(&path).unwrap();
            let run_id = storage.create_run(&SearchConfig::default(), "h").unwrap();
            storage
                .insert_listing(&listing("Clerk", "Acme", "u1"), run_id)
                .unwrap();
        }

        let storage = SqliteStorage::new(&path).unwrap();
        assert_eq!(storage.count_listings().unwrap(), 1);
    }
}
