//! Core data models and per-source clients
//!
//! `Site` is the record the rest of the application passes around; the
//! submodules hold one client per remote data source.

pub mod nps;
pub mod places;

pub use nps::{NpsClient, NpsError};
pub use places::{PlacesClient, PlacesError};

use serde::{Deserialize, Serialize};

/// A National Park Service site
///
/// Constructed from parsed markup or cache replay and immutable afterwards.
/// All fields are optional: `None` means the page was looked up and the
/// field was not present (some sites have no physical address, some have a
/// blank designation). Display placeholders are applied at render time
/// only, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Designation, e.g. "National Park"
    pub category: Option<String>,
    /// Name, e.g. "Isle Royale"
    pub name: Option<String>,
    /// City and state, e.g. "Houghton, MI"
    pub address: Option<String>,
    /// Zip code, e.g. "49931", "82190-0168"
    pub zipcode: Option<String>,
    /// Phone number, e.g. "906-482-0984"
    pub phone: Option<String>,
}

impl Site {
    /// One-line summary, e.g. `Isle Royale (National Park): Houghton, MI 49931`.
    pub fn info(&self) -> String {
        format!(
            "{} ({}): {} {}",
            self.name.as_deref().unwrap_or("no name"),
            self.category.as_deref().unwrap_or("no category"),
            self.address.as_deref().unwrap_or("no address"),
            self.zipcode.as_deref().unwrap_or("no zipcode"),
        )
    }
}
