//! Runtime configuration
//!
//! Everything the clients would otherwise hard-code lives here: the park
//! service base URL, the places-search endpoint and its tunable query
//! parameters, the API key, and the cache directory. `main` builds one
//! `Config` and passes it to each client at construction.

use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;

/// Base URL for the National Park Service site
const NPS_BASE_URL: &str = "https://www.nps.gov";

/// Places-search endpoint (MapQuest radius search)
const PLACES_SEARCH_URL: &str = "https://www.mapquestapi.com/search/v2/radius";

/// Environment variable holding the places-search API key
const API_KEY_VAR: &str = "PLACES_API_KEY";

/// Errors that can occur while assembling the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{API_KEY_VAR} environment variable is not set")]
    MissingApiKey,

    #[error("could not determine a cache directory for this platform")]
    NoCacheDir,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL relative links on park service pages are resolved against
    pub nps_base_url: String,
    /// Places-search endpoint
    pub places_url: String,
    /// API key sent with every places-search request
    pub places_api_key: String,
    /// Search radius passed to the places endpoint
    pub places_radius: u32,
    /// Maximum number of matches requested from the places endpoint
    pub places_max_matches: u32,
    /// Directory holding the persistent cache stores
    pub cache_dir: PathBuf,
}

impl Config {
    /// Builds a config with the standard endpoints and fixed search
    /// parameters.
    pub fn new(places_api_key: String, cache_dir: PathBuf) -> Self {
        Self {
            nps_base_url: NPS_BASE_URL.to_string(),
            places_url: PLACES_SEARCH_URL.to_string(),
            places_api_key,
            places_radius: 10,
            places_max_matches: 10,
            cache_dir,
        }
    }

    /// Reads the API key from the environment and resolves the
    /// XDG-compliant cache directory (`~/.cache/parkscout/` on Linux).
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| ConfigError::MissingApiKey)?;
        let cache_dir = ProjectDirs::from("", "", "parkscout")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .ok_or(ConfigError::NoCacheDir)?;
        Ok(Self::new(api_key, cache_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_standard_endpoints_and_parameters() {
        let config = Config::new("key".to_string(), PathBuf::from("/tmp/cache"));
        assert_eq!(config.nps_base_url, "https://www.nps.gov");
        assert_eq!(config.places_radius, 10);
        assert_eq!(config.places_max_matches, 10);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cache"));
    }
}
