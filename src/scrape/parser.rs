//! Job-card extraction from Indeed result pages
//!
//! Each field is looked up with its own selector and comes back as an
//! `Option`; defaults are substituted when the [`JobListing`] is built.
//! A card with missing fields is still emitted.

use crate::config::{parse_selector, SelectorConfig};
use crate::listing::JobListing;
use crate::url::{listing_url, resolve_link};
use crate::ConfigError;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Attribute carrying Indeed's job key
const JOB_KEY_ATTR: &str = "data-jk";

/// Compiled selectors for one page layout
#[derive(Debug, Clone)]
pub struct JobSelectors {
    pub card: Selector,
    pub title: Selector,
    pub company: Selector,
    pub location: Selector,
    pub summary: Selector,
    pub link: Selector,
}

impl JobSelectors {
    /// Compiles the configured selector strings
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            card: parse_selector("card", &config.card)?,
            title: parse_selector("title", &config.title)?,
            company: parse_selector("company", &config.company)?,
            location: parse_selector("location", &config.location)?,
            summary: parse_selector("summary", &config.summary)?,
            link: parse_selector("link", &config.link)?,
        })
    }
}

/// Extracts every job card of a results page, in page order
///
/// # Arguments
///
/// * `html` - Raw HTML of one results page
/// * `search_url` - The search URL the page was rendered from, used to
///   resolve relative links and job keys
/// * `selectors` - Compiled selectors for the page layout
///
/// # Example
///
/// ```
/// use indeed_harvest::config::SelectorConfig;
/// use indeed_harvest::scrape::{parse_jobs, JobSelectors};
/// use indeed_harvest::url::build_search_url;
///
/// let html = r#"<div class="job_seen_beacon" data-jk="42"><h2 class="jobTitle">Clerk</h2></div>"#;
/// let selectors = JobSelectors::from_config(&SelectorConfig::default()).unwrap();
/// let search = build_search_url("payroll", "us", 0).unwrap();
///
/// let jobs = parse_jobs(html, &search, &selectors);
/// assert_eq!(jobs[0].title, "Clerk");
/// assert_eq!(jobs[0].company, "Unknown");
/// assert_eq!(jobs[0].url, "https://www.indeed.com/viewjob?jk=42");
/// ```
pub fn parse_jobs(html: &str, search_url: &Url, selectors: &JobSelectors) -> Vec<JobListing> {
    parse_jobs_at(html, search_url, selectors, Utc::now())
}

/// Same as [`parse_jobs`] with an explicit extraction timestamp
pub fn parse_jobs_at(
    html: &str,
    search_url: &Url,
    selectors: &JobSelectors,
    scraped_at: DateTime<Utc>,
) -> Vec<JobListing> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.card)
        .map(|card| {
            JobListing::from_fields(
                select_text(&card, &selectors.title),
                select_text(&card, &selectors.company),
                select_text(&card, &selectors.location),
                select_text(&card, &selectors.summary),
                extract_url(&card, &selectors.link, search_url),
                scraped_at,
            )
        })
        .collect()
}

/// Text of the first non-empty match inside the card, whitespace collapsed
fn select_text(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .map(|element| collapse_whitespace(&element.text().collect::<Vec<_>>().join(" ")))
        .find(|text| !text.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves the listing URL of a card
///
/// Preference order: a job key on the card, a job key on a link inside it,
/// then the first link href that resolves to an http(s) URL.
fn extract_url(card: &ElementRef<'_>, link: &Selector, search_url: &Url) -> Option<String> {
    if let Some(key) = job_key(card) {
        return Some(listing_url(search_url, key));
    }

    for element in card.select(link) {
        if let Some(key) = job_key(&element) {
            return Some(listing_url(search_url, key));
        }
        if let Some(href) = element.value().attr("href") {
            if let Some(url) = resolve_link(href, search_url) {
                return Some(url);
            }
        }
    }

    None
}

fn job_key<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    element
        .value()
        .attr(JOB_KEY_ATTR)
        .map(str::trim)
        .filter(|key| !key.is_empty())
}
