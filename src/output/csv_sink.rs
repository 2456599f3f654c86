//! Append-only CSV output

use crate::listing::JobListing;
use crate::HarvestError;
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Column order of the CSV file
pub const CSV_HEADER: [&str; 6] = ["title", "company", "location", "summary", "url", "scraped_at"];

/// CSV file opened once per run and appended to page by page
pub struct CsvSink {
    path: PathBuf,
    writer: Writer<File>,
    written: u64,
}

impl CsvSink {
    /// Opens `path` for appending, writing the header if it is a new or empty file
    pub fn open(path: &Path) -> Result<Self, HarvestError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let metadata = file.metadata()?;
        let needs_header = metadata.is_file() && metadata.len() == 0;

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::NonNumeric)
            .from_writer(file);

        if needs_header {
            writer.write_record(CSV_HEADER)?;
            writer.flush()?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            written: 0,
        })
    }

    /// Appends one listing as a row
    pub fn append(&mut self, listing: &JobListing) -> Result<(), HarvestError> {
        self.writer.serialize(listing)?;
        self.written += 1;
        Ok(())
    }

    /// Flushes buffered rows to disk
    pub fn flush(&mut self) -> Result<(), HarvestError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Rows appended through this sink
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CsvSink {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!("Failed to flush {}: {}", self.path.display(), e);
        }
    }
}

/// Reads every listing row back from a CSV file written by [`CsvSink`]
pub fn read_listings(path: &Path) -> Result<Vec<JobListing>, HarvestError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut listings = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        listings.push(JobListing {
            title: field(0),
            company: field(1),
            location: field(2),
            summary: field(3),
            url: field(4),
            scraped_at: field(5),
        });
    }
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, summary: &str) -> JobListing {
        JobListing {
            title: title.to_string(),
            company: "Acme, Inc.".to_string(),
            location: "Unknown".to_string(),
            summary: summary.to_string(),
            url: "https://www.indeed.com/viewjob?jk=1".to_string(),
            scraped_at: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");

        {
            let mut sink = CsvSink::open(&path).unwrap();
            sink.append(&listing("Clerk", "a")).unwrap();
            sink.flush().unwrap();
        }
        {
            let mut sink = CsvSink::open(&path).unwrap();
            sink.append(&listing("Analyst", "b")).unwrap();
            sink.flush().unwrap();
            assert_eq!(sink.written(), 1);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let headers = content
            .lines()
            .filter(|l| l.starts_with("\"title\""))
            .count();
        assert_eq!(headers, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_rows_read_back_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");

        let tricky = listing("Clerk \"Senior\"", "line one\nline two, with comma");
        {
            let mut sink = CsvSink::open(&path).unwrap();
            sink.append(&tricky).unwrap();
        }

        let rows = read_listings(&path).unwrap();
        assert_eq!(rows, vec![tricky]);
    }
}
