//! Harvest coordinator - the top-level run loop
//!
//! Pages are fetched strictly one after another. The coordinator owns the
//! storage connection, the CSV file and the dedup set for the whole run.

use crate::config::{
    compute_config_hash, timeout_duration, validate, Config, FetchErrorPolicy, ENV_PROXY_USERNAME,
};
use crate::listing::{DedupSet, JobListing};
use crate::output::{CsvSink, RunSummary};
use crate::scrape::fetcher::{fetch_page, ProxyClient};
use crate::scrape::parser::{parse_jobs, JobSelectors};
use crate::storage::{RunCounts, RunStatus, SqliteStorage, Storage};
use crate::url::build_search_url;
use crate::HarvestError;
use std::path::Path;
use std::time::Duration;

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Config,
    proxy: ProxyClient,
    selectors: JobSelectors,
    storage: SqliteStorage,
    sink: CsvSink,
    dedup: DedupSet,
    timeout: Duration,
    run_id: i64,
}

/// Counts for one page, merged into the run summary once the page is committed
#[derive(Debug, Default)]
struct PageCounts {
    parsed: u64,
    added: u64,
    duplicates: u64,
    companies: Vec<String>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Opens (or creates) the database and the CSV file, seeds the dedup
    /// set from listings stored by earlier runs and records a new run.
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration, with proxy credentials
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Missing credentials or an unusable output
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        validate(&config)?;
        let timeout = timeout_duration(&config.proxy)?;

        let credentials = config
            .credentials
            .clone()
            .ok_or(HarvestError::MissingCredential(ENV_PROXY_USERNAME))?;

        let selectors = JobSelectors::from_config(&config.selectors)?;
        let proxy = ProxyClient::new(&config.proxy, credentials)?;

        let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        let known = storage.load_dedup_keys()?;
        tracing::info!(
            "Loaded {} known listing(s) from {}",
            known.len(),
            config.output.database_path
        );
        let dedup = DedupSet::with_keys(known);

        let sink = CsvSink::open(Path::new(&config.output.csv_path))?;

        let run_id = storage.create_run(&config.search, &compute_config_hash(&config.search))?;

        Ok(Self {
            config,
            proxy,
            selectors,
            storage,
            sink,
            dedup,
            timeout,
            run_id,
        })
    }

    /// ID of the run row this coordinator writes to
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Read access to the store, mainly for reporting
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Runs the harvest loop over every configured page
    ///
    /// The run row is finished as `completed` or `failed` whatever the
    /// outcome, with the counters gathered so far.
    pub async fn run(&mut self) -> Result<RunSummary, HarvestError> {
        tracing::info!(
            "Starting run {}: \"{}\" ({}), {} page(s)",
            self.run_id,
            self.config.search.query,
            self.config.search.country,
            self.config.search.pages
        );

        let mut summary = RunSummary::new(self.config.search.pages);
        let outcome = self.harvest(&mut summary).await;

        let status = if outcome.is_ok() {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };
        let counts = RunCounts {
            new_listings: summary.new_listings,
            duplicates: summary.duplicates,
            failed_pages: summary.failed_pages,
        };
        self.storage.finish_run(self.run_id, status, &counts)?;

        outcome.map(|()| summary)
    }

    async fn harvest(&mut self, summary: &mut RunSummary) -> Result<(), HarvestError> {
        let timeout = self.timeout;
        let pages = self.config.search.pages;

        for page_index in 0..pages {
            let search_url = build_search_url(
                &self.config.search.query,
                &self.config.search.country,
                page_index,
            )?;
            tracing::info!("Visiting {}", search_url);

            let html = match fetch_page(
                &self.proxy,
                &self.config.search.query,
                &self.config.search.country,
                page_index,
                timeout,
            )
            .await
            {
                Ok(html) => html,
                Err(e) => {
                    summary.failed_pages += 1;
                    match self.config.proxy.on_fetch_error {
                        FetchErrorPolicy::Continue => {
                            tracing::warn!("Skipping page {}: {}", page_index + 1, e);
                            continue;
                        }
                        FetchErrorPolicy::Abort => {
                            tracing::error!("Aborting at page {}: {}", page_index + 1, e);
                            return Err(e.into());
                        }
                    }
                }
            };

            summary.pages_fetched += 1;
            let listings = parse_jobs(&html, &search_url, &self.selectors);
            if listings.is_empty() {
                tracing::warn!("Page {} contained no job cards", page_index + 1);
            }

            let (added, duplicates) = self.persist_page(&listings, summary)?;
            tracing::info!(
                "Page {} → {} new ads, {} duplicate(s)",
                page_index + 1,
                added,
                duplicates
            );
        }

        if summary.pages_fetched == 0 {
            return Err(HarvestError::AllPagesFailed { pages });
        }

        Ok(())
    }

    /// Deduplicates one page of listings and writes the new ones out
    ///
    /// The page's inserts run in one storage batch that is committed only
    /// after the CSV rows are flushed. If either output fails, nothing of
    /// the page reaches the database, so both outputs hold the same records.
    ///
    /// # Returns
    ///
    /// `(new, duplicates)` for this page
    pub fn persist_page(
        &mut self,
        listings: &[JobListing],
        summary: &mut RunSummary,
    ) -> Result<(u64, u64), HarvestError> {
        self.storage.begin_batch()?;

        let page = match self.write_page(listings) {
            Ok(page) => page,
            Err(e) => {
                if let Err(rollback) = self.storage.rollback_batch() {
                    tracing::error!("Failed to roll back page: {}", rollback);
                }
                return Err(e);
            }
        };
        self.storage.commit_batch()?;

        summary.parsed += page.parsed;
        summary.new_listings += page.added;
        summary.duplicates += page.duplicates;
        summary.companies.extend(page.companies);
        Ok((page.added, page.duplicates))
    }

    fn write_page(&mut self, listings: &[JobListing]) -> Result<PageCounts, HarvestError> {
        let mut page = PageCounts::default();

        for listing in listings {
            page.parsed += 1;

            if !self.dedup.insert(listing) {
                tracing::trace!("Duplicate: {} @ {}", listing.title, listing.company);
                page.duplicates += 1;
                continue;
            }

            if !self.storage.insert_listing(listing, self.run_id)? {
                page.duplicates += 1;
                continue;
            }

            self.sink.append(listing)?;
            page.companies.push(listing.company.clone());
            page.added += 1;
        }

        self.sink.flush()?;
        Ok(page)
    }
}

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Open the database and CSV outputs
/// 2. Seed the dedup set from stored listings
/// 3. Fetch, parse and persist every configured page in turn
/// 4. Record the run outcome
///
/// # Arguments
///
/// * `config` - The validated configuration, with proxy credentials
///
/// # Returns
///
/// * `Ok(RunSummary)` - Aggregate counts of the run
/// * `Err(HarvestError)` - The run failed
pub async fn run_harvest(config: Config) -> Result<RunSummary, HarvestError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
