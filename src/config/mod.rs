//! Configuration module for Indeed-Harvest
//!
//! Settings come from built-in defaults, an optional TOML file, command-line
//! overrides and the environment, in that order of precedence.
//!
//! # Example
//!
//! ```no_run
//! use indeed_harvest::config::{resolve_config, ConfigOverrides};
//!
//! let config = resolve_config(None, ConfigOverrides::default()).unwrap();
//! println!("Will fetch {} page(s)", config.search.pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetchErrorPolicy, OutputConfig, ProxyConfig, ProxyCredentials, SearchConfig,
    SelectorConfig, DEFAULT_PROXY_ENDPOINT, DEFAULT_QUERY,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, parse_config, resolve_config, resolve_config_with_env,
    ConfigOverrides, ENV_PROXY_ENDPOINT, ENV_PROXY_PASSWORD, ENV_PROXY_USERNAME,
};
pub use validation::{parse_selector, timeout_duration, validate, MAX_PAGES, MAX_TIMEOUT_SECS};
