use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use homescout_core::{PropertyRecord, SearchQuery};

use crate::error::SourceError;
use crate::source::PropertySource;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// HTTP client for a HomeHarvest-style listing endpoint.
///
/// One `GET {base}/properties` per search; the endpoint owns pagination,
/// upstream throttling, and the actual scraping.
pub struct HarvestClient {
    client: reqwest::Client,
    base_url: String,
}

impl HarvestClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|err| SourceError::Client(err.to_string()))?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl PropertySource for HarvestClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PropertyRecord>, SourceError> {
        let url = format!("{}/properties", self.base_url);
        let mut request = self.client.get(&url).query(&[
            ("location", query.location.as_str()),
            ("listing_type", query.listing_type.as_wire()),
        ]);
        if let Some(radius) = query.radius {
            request = request.query(&[("radius", radius.to_string())]);
        }

        let response =
            request.send().await.map_err(|err| SourceError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                location: query.location.clone(),
            });
        }

        let raw: Vec<RawProperty> =
            response.json().await.map_err(|err| SourceError::Decode(err.to_string()))?;
        tracing::debug!(
            event_name = "harvest.search.fetched",
            location = %query.location,
            listing_type = %query.listing_type,
            count = raw.len(),
            "property source responded"
        );

        Ok(raw.into_iter().map(RawProperty::into_record).collect())
    }
}

/// Wire shape of one listing as the endpoint reports it.
///
/// Scraped feeds are ragged: numbers arrive as floats or as quoted strings,
/// dates as plain dates or full timestamps, and whole sections go missing.
/// Everything is optional here and normalized once, so `PropertyRecord`
/// stays clean.
#[derive(Debug, Default, Deserialize)]
struct RawProperty {
    property_url: Option<String>,
    mls: Option<String>,
    mls_id: Option<String>,
    status: Option<String>,
    street: Option<String>,
    unit: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    style: Option<String>,
    beds: Option<Numeric>,
    full_baths: Option<Numeric>,
    half_baths: Option<Numeric>,
    sqft: Option<Numeric>,
    year_built: Option<Numeric>,
    stories: Option<Numeric>,
    lot_sqft: Option<Numeric>,
    days_on_mls: Option<Numeric>,
    list_price: Option<Numeric>,
    list_date: Option<String>,
    pending_date: Option<String>,
    sold_price: Option<Numeric>,
    last_sold_date: Option<String>,
    price_per_sqft: Option<Numeric>,
    parking_garage: Option<Numeric>,
    hoa_fee: Option<Numeric>,
    latitude: Option<Numeric>,
    longitude: Option<Numeric>,
    nearby_schools: Option<String>,
    agent: Option<String>,
    agent_email: Option<String>,
    agent_phone: Option<String>,
    broker: Option<String>,
    broker_email: Option<String>,
    broker_website: Option<String>,
    #[serde(alias = "text")]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Number(value) => value.is_finite().then_some(*value),
            Self::Text(raw) => raw.trim().replace(',', "").parse::<f64>().ok(),
        }
    }
}

impl RawProperty {
    fn into_record(self) -> PropertyRecord {
        PropertyRecord {
            property_url: self.property_url,
            mls: self.mls,
            mls_id: self.mls_id,
            status: self.status,
            street: self.street,
            unit: self.unit,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            style: self.style,
            beds: as_u32(&self.beds),
            full_baths: as_u32(&self.full_baths),
            half_baths: as_u32(&self.half_baths),
            sqft: as_u32(&self.sqft),
            year_built: as_i64(&self.year_built).map(|value| value as i32),
            stories: as_u32(&self.stories),
            lot_sqft: as_i64(&self.lot_sqft).and_then(|value| u64::try_from(value).ok()),
            days_on_mls: as_u32(&self.days_on_mls),
            list_price: as_i64(&self.list_price),
            list_date: parse_date(self.list_date.as_deref()),
            pending_date: parse_date(self.pending_date.as_deref()),
            sold_price: as_i64(&self.sold_price),
            last_sold_date: parse_date(self.last_sold_date.as_deref()),
            price_per_sqft: as_f64(&self.price_per_sqft),
            parking_garage: as_u32(&self.parking_garage),
            hoa_fee: as_f64(&self.hoa_fee),
            latitude: as_f64(&self.latitude),
            longitude: as_f64(&self.longitude),
            nearby_schools: self.nearby_schools,
            agent: self.agent,
            agent_email: self.agent_email,
            agent_phone: self.agent_phone,
            broker: self.broker,
            broker_email: self.broker_email,
            broker_website: self.broker_website,
            description: self.description,
        }
    }
}

fn as_f64(raw: &Option<Numeric>) -> Option<f64> {
    raw.as_ref().and_then(Numeric::value)
}

fn as_i64(raw: &Option<Numeric>) -> Option<i64> {
    as_f64(raw).map(|value| value.round() as i64)
}

fn as_u32(raw: &Option<Numeric>) -> Option<u32> {
    as_f64(raw).filter(|value| *value >= 0.0).map(|value| value.round() as u32)
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|stamp| stamp.date_naive())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::RawProperty;

    fn decode(value: serde_json::Value) -> RawProperty {
        serde_json::from_value(value).expect("wire record should decode")
    }

    #[test]
    fn maps_a_typical_wire_record() {
        let record = decode(json!({
            "property_url": "https://listings.example/1",
            "mls_id": "SJ-100",
            "street": "1 Main St",
            "city": "San Jose",
            "zip_code": "95112",
            "beds": 3.0,
            "full_baths": 2.0,
            "half_baths": 0.0,
            "sqft": 1500.0,
            "list_price": 1500000.0,
            "list_date": "2024-05-01",
            "nearby_schools": "San Jose High"
        }))
        .into_record();

        assert_eq!(record.mls_id.as_deref(), Some("SJ-100"));
        assert_eq!(record.beds, Some(3));
        assert_eq!(record.bathrooms(), Some(2.0));
        assert_eq!(record.list_price, Some(1_500_000));
        assert_eq!(
            record.list_date,
            chrono::NaiveDate::from_ymd_opt(2024, 5, 1),
        );
    }

    #[test]
    fn tolerates_numbers_shipped_as_strings() {
        let record = decode(json!({
            "list_price": "1,250,000",
            "beds": "4",
            "sqft": " 1800 "
        }))
        .into_record();

        assert_eq!(record.list_price, Some(1_250_000));
        assert_eq!(record.beds, Some(4));
        assert_eq!(record.sqft, Some(1800));
    }

    #[test]
    fn malformed_numerics_become_absent_not_errors() {
        let record = decode(json!({
            "list_price": "call for price",
            "beds": "studio",
            "stories": -2.0
        }))
        .into_record();

        assert_eq!(record.list_price, None);
        assert_eq!(record.beds, None);
        assert_eq!(record.stories, None);
    }

    #[test]
    fn dates_parse_from_plain_and_timestamp_forms() {
        let record = decode(json!({
            "list_date": "2023-11-05",
            "last_sold_date": "2019-03-08T00:00:00+00:00",
            "pending_date": "soon"
        }))
        .into_record();

        assert_eq!(record.list_date, chrono::NaiveDate::from_ymd_opt(2023, 11, 5));
        assert_eq!(record.last_sold_date, chrono::NaiveDate::from_ymd_opt(2019, 3, 8));
        assert_eq!(record.pending_date, None);
    }

    #[test]
    fn unknown_wire_fields_are_ignored() {
        let record = decode(json!({
            "mls_id": "SJ-200",
            "open_house_schedule": ["saturday"],
            "flags": {"is_pending": false}
        }))
        .into_record();

        assert_eq!(record.mls_id.as_deref(), Some("SJ-200"));
    }
}
