use crate::config::types::{Config, FetchErrorPolicy, ProxyCredentials, SearchConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable holding the proxy username
pub const ENV_PROXY_USERNAME: &str = "SCRAPER_PROXY_USERNAME";

/// Environment variable holding the proxy password
pub const ENV_PROXY_PASSWORD: &str = "SCRAPER_PROXY_PASSWORD";

/// Environment variable overriding the proxy endpoint
pub const ENV_PROXY_ENDPOINT: &str = "SCRAPER_PROXY_ENDPOINT";

/// Values given on the command line, each one overriding the file/defaults
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub query: Option<String>,
    pub country: Option<String>,
    pub pages: Option<u32>,
    pub timeout_secs: Option<f64>,
    pub csv_path: Option<String>,
    pub database_path: Option<String>,
    pub fail_fast: bool,
}

impl ConfigOverrides {
    /// Applies every override that was given onto `config`
    pub fn apply(self, config: &mut Config) {
        if let Some(query) = self.query {
            config.search.query = query;
        }
        if let Some(country) = self.country {
            config.search.country = country;
        }
        if let Some(pages) = self.pages {
            config.search.pages = pages;
        }
        if let Some(timeout) = self.timeout_secs {
            config.proxy.timeout_secs = timeout;
        }
        if let Some(csv_path) = self.csv_path {
            config.output.csv_path = csv_path;
        }
        if let Some(database_path) = self.database_path {
            config.output.database_path = database_path;
        }
        if self.fail_fast {
            config.proxy.on_fetch_error = FetchErrorPolicy::Abort;
        }
    }
}

/// Parses TOML configuration text without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use indeed_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Pages: {}", config.search.pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    normalize(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Builds the effective configuration for a run
///
/// Layers, lowest precedence first: built-in defaults, the optional TOML
/// file, command-line overrides, then the environment (credentials and
/// endpoint override). The result is validated.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<Config, ConfigError> {
    resolve_config_with_env(path, overrides, |key| std::env::var(key).ok())
}

/// Same as [`resolve_config`] with an injectable environment lookup
pub fn resolve_config_with_env<F>(
    path: Option<&Path>,
    overrides: ConfigOverrides,
    env: F,
) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => parse_config(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };

    overrides.apply(&mut config);

    if let Some(endpoint) = env(ENV_PROXY_ENDPOINT).filter(|e| !e.trim().is_empty()) {
        config.proxy.endpoint = endpoint;
    }

    config.credentials = match (env(ENV_PROXY_USERNAME), env(ENV_PROXY_PASSWORD)) {
        (Some(username), Some(password)) if !username.is_empty() => {
            Some(ProxyCredentials { username, password })
        }
        _ => None,
    };

    normalize(&mut config);
    validate(&config)?;
    Ok(config)
}

fn normalize(config: &mut Config) {
    config.search.country = config.search.country.trim().to_ascii_lowercase();
    config.search.query = config.search.query.trim().to_string();
}

/// Computes a SHA-256 fingerprint of the search parameters
///
/// Runs with the same fingerprint asked the proxy for the same pages.
pub fn compute_config_hash(search: &SearchConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(search.query.as_bytes());
    hasher.update(b"|");
    hasher.update(search.country.as_bytes());
    hasher.update(b"|");
    hasher.update(search.pages.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[search]
query = "payroll clerk"
country = "CA"
pages = 5

[proxy]
endpoint = "https://proxy.example.com/v1/queries"
timeout-secs = 12.5
on-fetch-error = "abort"

[output]
csv-path = "./jobs.csv"
database-path = "./jobs.db"

[selectors]
card = "a.tapItem[data-jk]"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.search.query, "payroll clerk");
        assert_eq!(config.search.country, "ca");
        assert_eq!(config.search.pages, 5);
        assert_eq!(config.proxy.timeout_secs, 12.5);
        assert_eq!(config.proxy.on_fetch_error, FetchErrorPolicy::Abort);
        assert_eq!(config.output.csv_path, "./jobs.csv");
        assert_eq!(config.selectors.card, "a.tapItem[data-jk]");
        // Unset selectors keep their defaults
        assert_eq!(config.selectors.title, "h2.jobTitle");
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.search.pages, 3);
        assert_eq!(config.search.country, "us");
        assert_eq!(config.output.database_path, "heartland_jobs.db");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[search]\npages = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = create_temp_config("[search]\nquery = \"from file\"\npages = 7\n");
        let overrides = ConfigOverrides {
            query: Some("from cli".to_string()),
            timeout_secs: Some(5.0),
            fail_fast: true,
            ..Default::default()
        };

        let config = resolve_config_with_env(Some(file.path()), overrides, env_from(&[])).unwrap();

        assert_eq!(config.search.query, "from cli");
        assert_eq!(config.search.pages, 7);
        assert_eq!(config.proxy.timeout_secs, 5.0);
        assert_eq!(config.proxy.on_fetch_error, FetchErrorPolicy::Abort);
    }

    #[test]
    fn test_oversized_timeout_override_rejected() {
        let overrides = ConfigOverrides {
            timeout_secs: Some(1e30),
            ..Default::default()
        };

        let result = resolve_config_with_env(None, overrides, env_from(&[]));

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_credentials_read_from_env() {
        let env = env_from(&[
            (ENV_PROXY_USERNAME, "user"),
            (ENV_PROXY_PASSWORD, "secret"),
            (ENV_PROXY_ENDPOINT, "http://127.0.0.1:9000/v1/queries"),
        ]);

        let config = resolve_config_with_env(None, ConfigOverrides::default(), env).unwrap();

        let credentials = config.credentials.expect("credentials");
        assert_eq!(credentials.username, "user");
        assert_eq!(credentials.password, "secret");
        assert_eq!(config.proxy.endpoint, "http://127.0.0.1:9000/v1/queries");
    }

    #[test]
    fn test_missing_password_means_no_credentials() {
        let env = env_from(&[(ENV_PROXY_USERNAME, "user")]);
        let config = resolve_config_with_env(None, ConfigOverrides::default(), env).unwrap();
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_credentials_are_redacted_in_debug() {
        let credentials = ProxyCredentials {
            username: "user".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_config_hash_tracks_search_parameters() {
        let search = SearchConfig::default();
        let hash1 = compute_config_hash(&search);
        let hash2 = compute_config_hash(&search.clone());
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);

        let other = SearchConfig {
            pages: 4,
            ..SearchConfig::default()
        };
        assert_ne!(hash1, compute_config_hash(&other));
    }
}
