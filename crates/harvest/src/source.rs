use async_trait::async_trait;

use homescout_core::{PropertyRecord, SearchQuery};

use crate::error::SourceError;

/// Abstraction over property retrieval that the search tool uses.
/// This decouples the tool pipeline from any specific listing provider,
/// so filtering and formatting are testable against stub collections.
#[async_trait]
pub trait PropertySource: Send + Sync {
    /// Fetch the result collection for one query. Implementations perform
    /// exactly one upstream call per invocation and preserve the provider's
    /// result order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PropertyRecord>, SourceError>;
}
