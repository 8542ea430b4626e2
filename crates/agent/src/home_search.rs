use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use homescout_core::config::{ExportConfig, SearchConfig};
use homescout_core::{render_digest, write_csv, ListingType, SearchFilters, SearchQuery};
use homescout_harvest::PropertySource;

use crate::tools::{Tool, ToolError};

pub const HOME_SEARCH_TOOL_NAME: &str = "home_search";

const DESCRIPTION: &str = "Searches real-estate marketplaces for property listings. \
Takes a location (city, neighborhood, address, or zip code), an optional listing type \
(FOR_SALE, SOLD, FOR_RENT, PENDING; defaults to FOR_SALE), an optional search radius in \
miles, and optional price/bedroom/bathroom limits. Returns a plain-text digest of the \
matching listings with address, style, bed/bath counts, square footage, prices, nearby \
schools, listing URL, and description.";

/// Arguments the model supplies for one search.
#[derive(Clone, Debug, Deserialize)]
pub struct HomeSearchArgs {
    pub location: String,
    #[serde(default)]
    pub listing_type: Option<ListingType>,
    pub radius: Option<f64>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_beds: Option<u32>,
    pub min_baths: Option<f64>,
}

/// The one tool this assistant exposes.
///
/// Per invocation: exactly one property-source call, an optional CSV export
/// of the raw collection, a filtering pass when any threshold is set, then
/// the capped digest. Defaults come from configuration, not literals.
pub struct HomeSearchTool<S> {
    source: S,
    search: SearchConfig,
    export: ExportConfig,
}

impl<S: PropertySource> HomeSearchTool<S> {
    pub fn new(source: S, search: SearchConfig, export: ExportConfig) -> Self {
        Self { source, search, export }
    }

    pub async fn run(&self, args: HomeSearchArgs) -> Result<String, ToolError> {
        let query = SearchQuery {
            location: args.location.clone(),
            listing_type: args.listing_type.unwrap_or_default(),
            radius: Some(args.radius.unwrap_or(self.search.default_radius)),
        };
        tracing::info!(
            event_name = "tool.home_search.start",
            location = %query.location,
            listing_type = %query.listing_type,
            "searching listings"
        );

        let records = self.source.search(&query).await?;

        if self.export.enabled {
            let path = write_csv(&records, &self.export.data_dir, &self.export.filename)?;
            tracing::info!(
                event_name = "tool.home_search.exported",
                path = %path.display(),
                count = records.len(),
                "raw result collection exported"
            );
        }

        let filters = SearchFilters {
            min_price: args.min_price,
            max_price: args.max_price,
            min_beds: args.min_beds,
            min_baths: args.min_baths,
        };
        let matched = filters.apply(records);
        tracing::info!(
            event_name = "tool.home_search.finished",
            matched = matched.len(),
            rendered = matched.len().min(self.search.max_results),
            "digest ready"
        );

        Ok(render_digest(&matched, self.search.max_results))
    }
}

#[async_trait]
impl<S: PropertySource> Tool for HomeSearchTool<S> {
    fn name(&self) -> &'static str {
        HOME_SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City, neighborhood, address, or zip code to search around"
                },
                "listing_type": {
                    "type": "string",
                    "enum": ["FOR_SALE", "SOLD", "FOR_RENT", "PENDING"],
                    "description": "Market segment to search; defaults to FOR_SALE"
                },
                "radius": {
                    "type": "number",
                    "description": "Search radius in miles around the location"
                },
                "min_price": {
                    "type": "integer",
                    "description": "Lowest acceptable list price in dollars"
                },
                "max_price": {
                    "type": "integer",
                    "description": "Highest acceptable list price in dollars"
                },
                "min_beds": {
                    "type": "integer",
                    "description": "Minimum number of bedrooms"
                },
                "min_baths": {
                    "type": "number",
                    "description": "Minimum number of bathrooms; half baths count as 0.5"
                }
            },
            "required": ["location"]
        })
    }

    async fn invoke(&self, arguments: Value) -> Result<String, ToolError> {
        let args: HomeSearchArgs = serde_json::from_value(arguments)
            .map_err(|err| ToolError::Arguments(err.to_string()))?;
        self.run(args).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::TempDir;

    use homescout_core::config::{AppConfig, ExportConfig, SearchConfig};
    use homescout_core::{PropertyRecord, SearchQuery};
    use homescout_harvest::{PropertySource, SourceError};

    use super::{HomeSearchTool, HOME_SEARCH_TOOL_NAME};
    use crate::tools::{Tool, ToolError};

    struct StubSource {
        records: Vec<PropertyRecord>,
        seen: Mutex<Vec<SearchQuery>>,
    }

    impl StubSource {
        fn with_records(records: Vec<PropertyRecord>) -> Self {
            Self { records, seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl PropertySource for StubSource {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<PropertyRecord>, SourceError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(query.clone());
            }
            Ok(self.records.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PropertySource for FailingSource {
        async fn search(&self, _query: &SearchQuery) -> Result<Vec<PropertyRecord>, SourceError> {
            Err(SourceError::Request("connection refused".to_string()))
        }
    }

    fn search_config() -> SearchConfig {
        AppConfig::default().search
    }

    fn export_disabled() -> ExportConfig {
        AppConfig::default().export
    }

    fn record(mls_id: &str, list_price: i64, beds: u32, full_baths: u32) -> PropertyRecord {
        PropertyRecord {
            mls_id: Some(mls_id.to_string()),
            street: Some("742 Evergreen Terrace".to_string()),
            city: Some("San Jose".to_string()),
            zip_code: Some("95112".to_string()),
            list_price: Some(list_price),
            beds: Some(beds),
            full_baths: Some(full_baths),
            half_baths: Some(0),
            ..PropertyRecord::default()
        }
    }

    #[tokio::test]
    async fn san_jose_request_filters_to_the_in_budget_listing() {
        let source = StubSource::with_records(vec![
            record("SJ-1", 1_500_000, 3, 2),
            record("SJ-2", 3_000_000, 4, 3),
        ]);
        let tool = HomeSearchTool::new(source, search_config(), export_disabled());

        let digest = tool
            .invoke(json!({
                "location": "San Jose",
                "min_price": 1_000_000,
                "max_price": 2_000_000,
                "min_beds": 3,
                "min_baths": 2
            }))
            .await
            .expect("search should succeed");

        assert!(digest.contains("SJ-1"));
        assert!(!digest.contains("SJ-2"));
    }

    #[tokio::test]
    async fn digest_is_capped_at_the_configured_max_results() {
        let records = (0..7).map(|i| record(&format!("R-{i}"), 500_000, 3, 2)).collect();
        let tool = HomeSearchTool::new(
            StubSource::with_records(records),
            search_config(),
            export_disabled(),
        );

        let digest =
            tool.invoke(json!({ "location": "San Jose" })).await.expect("search should succeed");

        for kept in 0..5 {
            assert!(digest.contains(&format!("R-{kept}")), "record {kept} should be rendered");
        }
        assert!(!digest.contains("R-5"));
        assert!(!digest.contains("R-6"));
    }

    #[tokio::test]
    async fn defaults_fill_listing_type_and_radius() {
        let source = StubSource::with_records(vec![record("D-1", 1, 1, 1)]);
        let tool = HomeSearchTool::new(source, search_config(), export_disabled());

        tool.invoke(json!({ "location": "95112" })).await.expect("search should succeed");

        let seen = tool.source.seen.lock().expect("seen queries");
        assert_eq!(seen.len(), 1, "exactly one source call per invocation");
        assert_eq!(seen[0].listing_type, homescout_core::ListingType::ForSale);
        assert_eq!(seen[0].radius, Some(5.0));
    }

    #[tokio::test]
    async fn explicit_arguments_override_the_defaults() {
        let source = StubSource::with_records(Vec::new());
        let tool = HomeSearchTool::new(source, search_config(), export_disabled());

        tool.invoke(json!({ "location": "Oakland", "listing_type": "FOR_RENT", "radius": 2.5 }))
            .await
            .expect("search should succeed");

        let seen = tool.source.seen.lock().expect("seen queries");
        assert_eq!(seen[0].listing_type, homescout_core::ListingType::ForRent);
        assert_eq!(seen[0].radius, Some(2.5));
    }

    #[tokio::test]
    async fn source_failures_surface_as_tagged_errors() {
        let tool = HomeSearchTool::new(FailingSource, search_config(), export_disabled());

        let err = tool
            .invoke(json!({ "location": "San Jose" }))
            .await
            .expect_err("source failure should propagate as an error");

        assert!(matches!(err, ToolError::Source(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn missing_location_is_an_argument_error() {
        let tool = HomeSearchTool::new(
            StubSource::with_records(Vec::new()),
            search_config(),
            export_disabled(),
        );

        let err = tool.invoke(json!({ "radius": 5.0 })).await.expect_err("location is required");
        assert!(matches!(err, ToolError::Arguments(_)));
    }

    #[tokio::test]
    async fn enabled_export_snapshots_the_raw_collection() {
        let dir = TempDir::new().expect("tempdir");
        let export = ExportConfig {
            enabled: true,
            data_dir: dir.path().join("data"),
            filename: "listings.csv".to_string(),
        };
        // Both records hit the snapshot even though the filter drops one.
        let source = StubSource::with_records(vec![
            record("E-1", 900_000, 3, 2),
            record("E-2", 100_000, 1, 1),
        ]);
        let tool = HomeSearchTool::new(source, search_config(), export);

        tool.invoke(json!({ "location": "San Jose", "min_beds": 2 }))
            .await
            .expect("search should succeed");

        let mut reader =
            csv::Reader::from_path(dir.path().join("data").join("listings.csv")).expect("open csv");
        let rows: Vec<PropertyRecord> =
            reader.deserialize().collect::<Result<_, _>>().expect("decode csv");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn schema_requires_location_only() {
        let tool = HomeSearchTool::new(
            StubSource::with_records(Vec::new()),
            search_config(),
            export_disabled(),
        );
        assert_eq!(tool.name(), HOME_SEARCH_TOOL_NAME);

        let schema = tool.input_schema();
        assert_eq!(schema["required"], json!(["location"]));
        assert_eq!(schema["properties"]["listing_type"]["enum"][0], "FOR_SALE");
    }
}
