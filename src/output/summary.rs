use std::collections::BTreeSet;
use std::fmt;

/// Aggregate counts of one harvesting run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pages the run was asked to walk
    pub pages_requested: u32,

    /// Pages fetched successfully
    pub pages_fetched: u32,

    /// Pages whose fetch failed
    pub failed_pages: u32,

    /// Job cards extracted across all fetched pages
    pub parsed: u64,

    /// Listings persisted for the first time
    pub new_listings: u64,

    /// Listings dropped as already seen
    pub duplicates: u64,

    /// Distinct companies among the new listings
    pub companies: BTreeSet<String>,
}

impl RunSummary {
    pub fn new(pages_requested: u32) -> Self {
        Self {
            pages_requested,
            ..Default::default()
        }
    }

    /// Number of distinct companies among the new listings
    pub fn company_count(&self) -> usize {
        self.companies.len()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scraped {} unique ads from {} companies",
            self.new_listings,
            self.company_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let mut summary = RunSummary::new(3);
        summary.new_listings = 4;
        summary.companies.insert("Acme".to_string());
        summary.companies.insert("Globex".to_string());
        summary.companies.insert("Acme".to_string());

        assert_eq!(summary.to_string(), "Scraped 4 unique ads from 2 companies");
    }
}
