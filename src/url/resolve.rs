use url::Url;

/// Builds the canonical `viewjob` URL for an Indeed job key
///
/// The listing lives on the same Indeed site as the search it came from.
///
/// # Examples
///
/// ```
/// use indeed_harvest::url::{build_search_url, listing_url};
///
/// let search = build_search_url("payroll", "us", 0).unwrap();
/// assert_eq!(listing_url(&search, "abc123"), "https://www.indeed.com/viewjob?jk=abc123");
/// ```
pub fn listing_url(search_url: &Url, job_key: &str) -> String {
    let mut url = search_url.clone();
    url.set_path("/viewjob");
    url.set_fragment(None);
    url.query_pairs_mut().clear().append_pair("jk", job_key.trim());
    url.to_string()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url.to_string())
    } else {
        None
    }
}
