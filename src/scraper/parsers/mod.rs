//! HTML parsers for the release source page.

pub mod release_table;

pub use release_table::{RawReleaseRow, ReleaseTableParser};
