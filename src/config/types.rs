use serde::Deserialize;

/// Default search phrase, matching the payroll-experience search the tool was built for
pub const DEFAULT_QUERY: &str = "experience with Heartland Payroll";

/// Default realtime endpoint of the scraping proxy
pub const DEFAULT_PROXY_ENDPOINT: &str = "https://realtime.oxylabs.io/v1/queries";

/// Main configuration structure for Indeed-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Proxy credentials, only ever read from the environment
    #[serde(skip)]
    pub credentials: Option<ProxyCredentials>,
}

/// What to search for and how many result pages to walk
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Free-text search phrase
    pub query: String,

    /// Two-letter country code selecting the Indeed site
    pub country: String,

    /// Number of result pages to fetch, starting at page 0
    pub pages: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            country: "us".to_string(),
            pages: 3,
        }
    }
}

/// Scraping proxy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Realtime endpoint the search URLs are submitted to
    pub endpoint: String,

    /// Total request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: f64,

    /// What to do when a page cannot be fetched
    #[serde(rename = "on-fetch-error")]
    pub on_fetch_error: FetchErrorPolicy,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PROXY_ENDPOINT.to_string(),
            timeout_secs: 60.0,
            on_fetch_error: FetchErrorPolicy::Continue,
        }
    }
}

/// Page-level failure policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchErrorPolicy {
    /// Log the failure and move on to the next page
    #[default]
    Continue,
    /// Stop the run at the first failed page
    Abort,
}

/// Output destinations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the append-only CSV file
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "heartland_jobs.csv".to_string(),
            database_path: "heartland_jobs.db".to_string(),
        }
    }
}

/// CSS selectors used to pick job cards and their fields apart
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub card: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub summary: String,
    pub link: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: "div.job_seen_beacon".to_string(),
            title: "h2.jobTitle".to_string(),
            company: r#"[data-testid="company-name"], span.companyName"#.to_string(),
            location: r#"[data-testid="text-location"], div.companyLocation"#.to_string(),
            summary: r#"div.job-snippet, [data-testid="jobsnippet_footer"]"#.to_string(),
            link: "a[data-jk], a.jcs-JobTitle, h2.jobTitle a[href]".to_string(),
        }
    }
}

/// Basic-auth credentials for the scraping proxy
#[derive(Clone)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
