//! URL handling module for Indeed-Harvest
//!
//! Builds the Indeed search URLs handed to the scraping proxy and turns
//! job keys and relative links found in result pages into absolute
//! listing URLs.

mod resolve;
mod search;

// Re-export main functions
pub use resolve::{listing_url, resolve_link};
pub use search::{build_search_url, search_base, RESULTS_PER_PAGE};
