use super::ConfigError;
use std::env;
use url::Url;

/// Load a variable from the environment
pub fn load_string(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::missing(key))
}

/// Load a variable from the environment
pub fn load_string_opt(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Load a variable from the environment
pub fn load_u64_opt(key: &str) -> Result<Option<u64>, ConfigError> {
    load_string_opt(key).map(|val| val.parse::<u64>()).transpose().map_err(Into::into)
}

/// Load a variable from the environment
pub fn load_url(key: &str) -> Result<Url, ConfigError> {
    load_string(key)?.parse().map_err(Into::into)
}
