use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Market segment a search targets. Wire form is the scraper's
/// SCREAMING_SNAKE_CASE vocabulary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingType {
    #[default]
    ForSale,
    Sold,
    ForRent,
    Pending,
}

impl ListingType {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::ForSale => "FOR_SALE",
            Self::Sold => "SOLD",
            Self::ForRent => "FOR_RENT",
            Self::Pending => "PENDING",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported listing type `{0}` (expected for_sale|sold|for_rent|pending)")]
pub struct ParseListingTypeError(String);

impl FromStr for ListingType {
    type Err = ParseListingTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "for_sale" => Ok(Self::ForSale),
            "sold" => Ok(Self::Sold),
            "for_rent" => Ok(Self::ForRent),
            "pending" => Ok(Self::Pending),
            other => Err(ParseListingTypeError(other.to_string())),
        }
    }
}

/// One property as returned by the source, flattened and read-only.
///
/// Every field is optional: upstream listing feeds are ragged, and a record
/// with holes is still worth showing. Code that needs a field to be present
/// (the filter, the formatter) decides per field how to handle absence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    // Source identifiers
    pub property_url: Option<String>,
    pub mls: Option<String>,
    pub mls_id: Option<String>,
    pub status: Option<String>,

    // Address
    pub street: Option<String>,
    pub unit: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,

    // Structure
    pub style: Option<String>,
    pub beds: Option<u32>,
    pub full_baths: Option<u32>,
    pub half_baths: Option<u32>,
    pub sqft: Option<u32>,
    pub year_built: Option<i32>,
    pub stories: Option<u32>,
    pub lot_sqft: Option<u64>,

    // Listing
    pub days_on_mls: Option<u32>,
    pub list_price: Option<i64>,
    pub list_date: Option<NaiveDate>,
    pub pending_date: Option<NaiveDate>,
    pub sold_price: Option<i64>,
    pub last_sold_date: Option<NaiveDate>,
    pub price_per_sqft: Option<f64>,
    pub parking_garage: Option<u32>,
    pub hoa_fee: Option<f64>,

    // Location
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub nearby_schools: Option<String>,

    // Agent
    pub agent: Option<String>,
    pub agent_email: Option<String>,
    pub agent_phone: Option<String>,

    // Broker
    pub broker: Option<String>,
    pub broker_email: Option<String>,
    pub broker_website: Option<String>,

    pub description: Option<String>,
}

impl PropertyRecord {
    /// Derived bathroom count: full baths plus half a point per half bath.
    ///
    /// Defined only when both parts are present; threshold comparisons against
    /// a partially-known count fail closed.
    pub fn bathrooms(&self) -> Option<f64> {
        let full = self.full_baths?;
        let half = self.half_baths?;
        Some(f64::from(full) + 0.5 * f64::from(half))
    }
}

/// Parameters for one source call. Built once per tool invocation and
/// immutable for that call.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    pub location: String,
    pub listing_type: ListingType,
    /// Search radius in miles around the location, when the source supports it.
    pub radius: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::{ListingType, PropertyRecord};

    #[test]
    fn listing_type_parses_loose_cli_spellings() {
        assert_eq!("for_sale".parse::<ListingType>(), Ok(ListingType::ForSale));
        assert_eq!("FOR-RENT".parse::<ListingType>(), Ok(ListingType::ForRent));
        assert_eq!(" Sold ".parse::<ListingType>(), Ok(ListingType::Sold));
        assert_eq!("pending".parse::<ListingType>(), Ok(ListingType::Pending));
        assert!("leased".parse::<ListingType>().is_err());
    }

    #[test]
    fn listing_type_wire_form_round_trips_through_serde() {
        let encoded = serde_json::to_string(&ListingType::ForSale).expect("encode");
        assert_eq!(encoded, "\"FOR_SALE\"");
        let decoded: ListingType = serde_json::from_str("\"FOR_RENT\"").expect("decode");
        assert_eq!(decoded, ListingType::ForRent);
    }

    #[test]
    fn bathrooms_combines_full_and_half_counts() {
        let record = PropertyRecord {
            full_baths: Some(2),
            half_baths: Some(1),
            ..PropertyRecord::default()
        };
        assert_eq!(record.bathrooms(), Some(2.5));
    }

    #[test]
    fn bathrooms_is_undefined_when_either_part_is_missing() {
        let no_half = PropertyRecord { full_baths: Some(2), ..PropertyRecord::default() };
        assert_eq!(no_half.bathrooms(), None);

        let no_full = PropertyRecord { half_baths: Some(1), ..PropertyRecord::default() };
        assert_eq!(no_full.bathrooms(), None);
    }
}
