//! Places-search API client
//!
//! Resolves nearby places of interest for a site through the third-party
//! radius-search endpoint. Results are cached by zip code, so two sites
//! sharing a zip code share one cached response. The response body is
//! cached and returned verbatim; only the shell interprets it.

use serde_json::Value;
use thiserror::Error;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::data::Site;
use crate::fetch::{Fetch, FetchError};

/// Distance unit for the radius parameter (miles)
const UNITS: &str = "m";

/// How the endpoint should treat ambiguous origins
const AMBIGUITIES: &str = "ignore";

/// Response format requested from the endpoint
const OUT_FORMAT: &str = "json";

/// Errors that can occur while resolving nearby places
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The endpoint answered with a body that is not valid JSON
    #[error("places response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Client for the places-search endpoint.
pub struct PlacesClient<F> {
    fetcher: F,
    search_url: String,
    api_key: String,
    radius: u32,
    max_matches: u32,
    store: CacheStore<Value>,
}

impl<F: Fetch> PlacesClient<F> {
    pub fn new(config: &Config, fetcher: F) -> Self {
        Self {
            fetcher,
            search_url: config.places_url.clone(),
            api_key: config.places_api_key.clone(),
            radius: config.places_radius,
            max_matches: config.places_max_matches,
            store: CacheStore::new(&config.cache_dir, "places"),
        }
    }

    /// Nearby places for a site, keyed by its zip code.
    ///
    /// A site without a zip code has no searchable location: the empty
    /// object comes back immediately, touching neither the network nor the
    /// store. Otherwise the verbatim search response is served read-through
    /// from the zip-keyed store.
    pub fn nearby(&mut self, site: &Site) -> Result<Value, PlacesError> {
        let Some(zipcode) = site.zipcode.as_deref() else {
            return Ok(Value::Object(serde_json::Map::new()));
        };

        let url = format!(
            "{}?key={}&origin={}&radius={}&units={UNITS}&maxMatches={}&ambiguities={AMBIGUITIES}&outFormat={OUT_FORMAT}",
            self.search_url, self.api_key, zipcode, self.radius, self.max_matches
        );
        let fetcher = &self.fetcher;
        self.store.get_or_fetch(zipcode, || {
            let body = fetcher.get(&url)?;
            Ok(serde_json::from_str(&body)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Always serves the same body and counts invocations.
    struct CountingFetcher {
        body: String,
        calls: Rc<Cell<u32>>,
    }

    impl Fetch for CountingFetcher {
        fn get(&self, _url: &str) -> Result<String, FetchError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.body.clone())
        }
    }

    fn site_with_zip(zipcode: Option<&str>) -> Site {
        Site {
            category: Some("National Park".to_string()),
            name: Some("Isle Royale".to_string()),
            address: Some("Houghton, MI".to_string()),
            zipcode: zipcode.map(str::to_string),
            phone: Some("906-482-0984".to_string()),
        }
    }

    fn test_client(
        temp_dir: &TempDir,
        body: &str,
    ) -> (PlacesClient<CountingFetcher>, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let fetcher = CountingFetcher {
            body: body.to_string(),
            calls: Rc::clone(&calls),
        };
        let config = Config::new("key".to_string(), temp_dir.path().to_path_buf());
        (PlacesClient::new(&config, fetcher), calls)
    }

    #[test]
    fn test_missing_zipcode_short_circuits_with_empty_object() {
        let temp_dir = TempDir::new().unwrap();
        let (mut client, calls) = test_client(&temp_dir, r#"{"searchResults": []}"#);

        let result = client.nearby(&site_with_zip(None)).unwrap();

        assert_eq!(result, Value::Object(serde_json::Map::new()));
        assert_eq!(calls.get(), 0, "no network call for a missing zip code");
        assert!(
            !temp_dir.path().join("places.json").exists(),
            "no cache interaction for a missing zip code"
        );
    }

    #[test]
    fn test_sites_sharing_a_zip_code_share_one_cache_entry() {
        let temp_dir = TempDir::new().unwrap();
        let body = r#"{"searchResults": [{"name": "Diner"}]}"#;
        let (mut client, calls) = test_client(&temp_dir, body);

        let first = client.nearby(&site_with_zip(Some("49931"))).unwrap();
        let second = client.nearby(&site_with_zip(Some("49931"))).unwrap();

        assert_eq!(calls.get(), 1, "second site replays the shared entry");
        assert_eq!(first, second);
        assert_eq!(first["searchResults"][0]["name"], "Diner");
    }

    #[test]
    fn test_response_is_cached_verbatim_under_the_zip_code() {
        let temp_dir = TempDir::new().unwrap();
        let body = r#"{"searchResults": [{"name": "Diner"}], "resultsCount": 1}"#;
        let (mut client, _calls) = test_client(&temp_dir, body);

        client.nearby(&site_with_zip(Some("49931"))).unwrap();

        let contents = std::fs::read_to_string(temp_dir.path().join("places.json")).unwrap();
        let on_disk: Value = serde_json::from_str(&contents).unwrap();
        let expected: Value = serde_json::from_str(body).unwrap();
        assert_eq!(on_disk["49931"], expected);
    }

    #[test]
    fn test_distinct_zip_codes_fetch_independently() {
        let temp_dir = TempDir::new().unwrap();
        let (mut client, calls) = test_client(&temp_dir, r#"{"searchResults": []}"#);

        client.nearby(&site_with_zip(Some("49931"))).unwrap();
        client.nearby(&site_with_zip(Some("82190"))).unwrap();

        assert_eq!(calls.get(), 2);
    }
}
