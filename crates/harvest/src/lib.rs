//! Property source boundary.
//!
//! The assistant never scrapes anything itself. It talks to a property
//! source through the [`PropertySource`] trait and ships one implementation,
//! [`HarvestClient`], a thin HTTP client for a HomeHarvest-style listing
//! endpoint. The raw wire records are mapped into
//! [`homescout_core::PropertyRecord`] at this edge so everything above it
//! works with one clean domain type.

mod error;
mod http;
mod source;

pub use error::SourceError;
pub use http::HarvestClient;
pub use source::PropertySource;
