//! Release scraper module.
//!
//! Fetches the yearly video game page, extracts release tables, cleans the
//! rows and writes them to the store.

pub mod cleaner;
pub mod fetcher;
pub mod parsers;
pub mod pipeline;

pub use fetcher::{build_client, FetchError};
pub use pipeline::{refresh, RefreshSummary};

/// Build the source page URL for a year from a `{year}` template
pub fn source_url(template: &str, year: i32) -> String {
    template.replace("{year}", &year.to_string())
}
