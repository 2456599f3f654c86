use url::Url;

/// Number of listings Indeed shows per results page
pub const RESULTS_PER_PAGE: u32 = 10;

/// Returns the `/jobs` endpoint of the Indeed site for a country
///
/// The US site lives on `www.indeed.com`; every other country has its own
/// subdomain, e.g. `ca.indeed.com`.
pub fn search_base(country: &str) -> String {
    let country = country.to_ascii_lowercase();
    if country == "us" {
        "https://www.indeed.com/jobs".to_string()
    } else {
        format!("https://{}.indeed.com/jobs", country)
    }
}

/// Builds the search URL for one page of results
///
/// # Arguments
///
/// * `query` - Free-text search phrase
/// * `country` - Two-letter country code
/// * `page_index` - Zero-based result page
///
/// # Examples
///
/// ```
/// use indeed_harvest::url::build_search_url;
///
/// let url = build_search_url("heartland payroll", "us", 2).unwrap();
/// assert_eq!(url.as_str(), "https://www.indeed.com/jobs?q=heartland+payroll&start=20");
/// ```
pub fn build_search_url(query: &str, country: &str, page_index: u32) -> Result<Url, url::ParseError> {
    let start = page_index.saturating_mul(RESULTS_PER_PAGE).to_string();
    Url::parse_with_params(
        &search_base(country),
        &[("q", query), ("start", start.as_str())],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_us_uses_www() {
        assert_eq!(search_base("us"), "https://www.indeed.com/jobs");
        assert_eq!(search_base("US"), "https://www.indeed.com/jobs");
    }

    #[test]
    fn test_other_countries_use_subdomain() {
        assert_eq!(search_base("ca"), "https://ca.indeed.com/jobs");
        assert_eq!(search_base("UK"), "https://uk.indeed.com/jobs");
    }

    #[test]
    fn test_first_page_starts_at_zero() {
        let url = build_search_url("payroll", "us", 0).unwrap();
        assert_eq!(url.as_str(), "https://www.indeed.com/jobs?q=payroll&start=0");
    }

    #[test]
    fn test_page_offset() {
        let url = build_search_url("payroll", "ca", 3).unwrap();
        assert_eq!(url.host_str(), Some("ca.indeed.com"));
        assert!(url.as_str().ends_with("start=30"));
    }

    #[test]
    fn test_query_is_encoded() {
        let url = build_search_url("c++ & payroll", "us", 0).unwrap();
        let q: Vec<_> = url.query_pairs().filter(|(k, _)| k == "q").collect();
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].1, "c++ & payroll");
        assert!(!url.as_str().contains(' '));
    }
}
