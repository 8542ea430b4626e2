//! Core domain for the homescout assistant.
//!
//! This crate holds everything that does not need an LLM or a network to be
//! useful: the listing domain model, the result filter, the digest formatter,
//! CSV export, and configuration loading. The agent and source crates build
//! on top of these types; nothing in here performs I/O beyond the export
//! helper.

pub mod config;
pub mod digest;
pub mod domain;
pub mod export;
pub mod filter;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use digest::{format_listing, render_digest};
pub use domain::listing::{ListingType, PropertyRecord, SearchQuery};
pub use export::{write_csv, ExportError};
pub use filter::SearchFilters;
