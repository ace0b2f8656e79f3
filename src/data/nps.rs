//! National Park Service page client
//!
//! Resolves the three chained page kinds behind their own cache stores: the
//! state directory on the index page (cached as one aggregate mapping), raw
//! state-page markup (cached by URL), and per-site detail records (cached
//! by URL). Each site on a state page is resolved independently, so a
//! partially warmed site store is normal.

use std::collections::HashMap;

use thiserror::Error;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::data::Site;
use crate::fetch::{Fetch, FetchError};
use crate::scrape::{self, ScrapeError};

/// Errors that can occur while resolving park service pages
#[derive(Debug, Error)]
pub enum NpsError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

/// Client for the park service's index, state, and site pages.
pub struct NpsClient<F> {
    fetcher: F,
    base_url: String,
    directory: CacheStore<String>,
    listings: CacheStore<String>,
    sites: CacheStore<Site>,
}

impl<F: Fetch> NpsClient<F> {
    pub fn new(config: &Config, fetcher: F) -> Self {
        Self {
            fetcher,
            base_url: config.nps_base_url.clone(),
            directory: CacheStore::new(&config.cache_dir, "directory"),
            listings: CacheStore::new(&config.cache_dir, "listings"),
            sites: CacheStore::new(&config.cache_dir, "sites"),
        }
    }

    /// Mapping from lower-cased state name to absolute state-page URL.
    ///
    /// The whole mapping is the cached unit. Callers do their own name
    /// lookup; a name that is missing here is a user input error, not a
    /// cache error.
    pub fn state_directory(&mut self) -> Result<HashMap<String, String>, NpsError> {
        let fetcher = &self.fetcher;
        let base_url = &self.base_url;
        self.directory.get_all_or_fetch(|| {
            let markup = fetcher.get(&format!("{base_url}/index.htm"))?;
            let mut directory = HashMap::new();
            for (name, href) in scrape::state_links(&markup)? {
                directory.insert(name.to_lowercase(), format!("{base_url}{href}"));
            }
            Ok(directory)
        })
    }

    /// Sites listed on a state page, in the page's display order.
    ///
    /// The raw markup is cached by the state URL; every site link found in
    /// it is then resolved through [`site`](Self::site) as its own
    /// independently cached call.
    pub fn sites_for_state(&mut self, state_url: &str) -> Result<Vec<Site>, NpsError> {
        let fetcher = &self.fetcher;
        let markup = self
            .listings
            .get_or_fetch(state_url, || fetcher.get(state_url).map_err(NpsError::from))?;

        let mut sites = Vec::new();
        for href in scrape::site_links(&markup)? {
            let site_url = format!("{}{}", self.base_url, href);
            sites.push(self.site(&site_url)?);
        }
        Ok(sites)
    }

    /// A single site's detail record, cached by its page URL.
    pub fn site(&mut self, site_url: &str) -> Result<Site, NpsError> {
        let fetcher = &self.fetcher;
        self.sites.get_or_fetch(site_url, || {
            let markup = fetcher.get(site_url)?;
            let fields = scrape::site_fields(&markup)?;
            Ok(Site {
                category: Some(fields.category),
                name: Some(fields.name),
                address: fields.address,
                zipcode: fields.zipcode,
                phone: Some(fields.phone),
            })
        })
    }
}
