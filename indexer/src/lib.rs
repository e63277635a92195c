//! Turns a generated site into the two search artifacts, and fetches them
//! back at query time.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod site;

pub use config::{IndexerConfig, SiteConfig};
pub use pipeline::{build_site, BuildReport};
