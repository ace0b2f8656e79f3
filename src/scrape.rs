//! Page-parser capabilities over raw markup
//!
//! Extracts the fixed set of fields the clients need from the park service
//! pages: the state drop-down on the index page, the per-site heading links
//! inside a state page's results container, and the detail fields of a site
//! page. Address and postal-code nodes are legitimately absent on some site
//! pages and come back as `None`; every other missing node is an error.

use scraper::{Html, Selector};
use thiserror::Error;

/// Errors that can occur while extracting fields from markup
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A CSS selector failed to parse
    #[error("invalid selector: {0}")]
    Selector(&'static str),

    /// An expected element was not found in the markup
    #[error("missing expected element: {0}")]
    MissingElement(&'static str),
}

/// Field values extracted from one site detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFields {
    pub name: String,
    pub category: String,
    /// Locality and region joined as `"Houghton, MI"`, when both are present
    pub address: Option<String>,
    pub zipcode: Option<String>,
    pub phone: String,
}

/// State entries from the index page's navigation drop-down, in document
/// order: `(display name, relative href)`.
pub fn state_links(markup: &str) -> Result<Vec<(String, String)>, ScrapeError> {
    let document = Html::parse_document(markup);
    let menu_selector = selector("ul.dropdown-menu.SearchBar-keywordSearch")?;
    let item_selector = selector("li")?;
    let link_selector = selector("a")?;

    let menu = document
        .select(&menu_selector)
        .next()
        .ok_or(ScrapeError::MissingElement("state drop-down menu"))?;

    let mut states = Vec::new();
    for item in menu.select(&item_selector) {
        let link = item
            .select(&link_selector)
            .next()
            .ok_or(ScrapeError::MissingElement("state link"))?;
        let href = link
            .value()
            .attr("href")
            .ok_or(ScrapeError::MissingElement("state link href"))?;
        states.push((element_text(&item), href.to_string()));
    }
    Ok(states)
}

/// Relative site links from the headings inside a state page's results
/// container, in display order.
pub fn site_links(markup: &str) -> Result<Vec<String>, ScrapeError> {
    let document = Html::parse_document(markup);
    let container_selector = selector("div#parkListResultsArea")?;
    let heading_selector = selector("h3")?;
    let link_selector = selector("a")?;

    let container = document
        .select(&container_selector)
        .next()
        .ok_or(ScrapeError::MissingElement("park list results container"))?;

    let mut links = Vec::new();
    for heading in container.select(&heading_selector) {
        let link = heading
            .select(&link_selector)
            .next()
            .ok_or(ScrapeError::MissingElement("site heading link"))?;
        let href = link
            .value()
            .attr("href")
            .ok_or(ScrapeError::MissingElement("site heading href"))?;
        links.push(href.to_string());
    }
    Ok(links)
}

/// Detail fields from a site page.
///
/// Name, category, and phone live at fixed locations and error when absent;
/// some sites have no physical address, so locality/region and postal code
/// are allowed to be missing.
pub fn site_fields(markup: &str) -> Result<SiteFields, ScrapeError> {
    let document = Html::parse_document(markup);

    let name = required_text(&document, "a.Hero-title", "hero title")?;
    let category = required_text(&document, "span.Hero-designation", "hero designation")?;
    let locality = optional_text(&document, r#"span[itemprop="addressLocality"]"#)?;
    let region = optional_text(&document, r#"span[itemprop="addressRegion"]"#)?;
    let address = match (locality, region) {
        (Some(locality), Some(region)) => Some(format!("{locality}, {region}")),
        _ => None,
    };
    let zipcode = optional_text(&document, r#"span.postal-code[itemprop="postalCode"]"#)?;
    let phone = required_text(&document, r#"span.tel[itemprop="telephone"]"#, "telephone")?;

    Ok(SiteFields {
        name,
        category,
        address,
        zipcode,
        phone,
    })
}

fn selector(css: &'static str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css))
}

fn element_text(element: &scraper::ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn required_text(
    document: &Html,
    css: &'static str,
    what: &'static str,
) -> Result<String, ScrapeError> {
    let sel = selector(css)?;
    let element = document
        .select(&sel)
        .next()
        .ok_or(ScrapeError::MissingElement(what))?;
    Ok(element_text(&element))
}

fn optional_text(document: &Html, css: &'static str) -> Result<Option<String>, ScrapeError> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .map(|e| element_text(&e))
        .filter(|text| !text.is_empty()))
}
