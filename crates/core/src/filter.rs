use serde::{Deserialize, Serialize};

use crate::domain::listing::PropertyRecord;

/// Numeric thresholds applied to one result collection.
///
/// Unset thresholds impose nothing; a record missing a field that a set
/// threshold needs is excluded rather than guessed at. Filtering is a
/// selection: records pass through untouched and in their original order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_beds: Option<u32>,
    pub min_baths: Option<f64>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_beds.is_none()
            && self.min_baths.is_none()
    }

    pub fn matches(&self, record: &PropertyRecord) -> bool {
        if let Some(min_price) = self.min_price {
            match record.list_price {
                Some(price) if price >= min_price => {}
                _ => return false,
            }
        }
        if let Some(max_price) = self.max_price {
            match record.list_price {
                Some(price) if price <= max_price => {}
                _ => return false,
            }
        }
        if let Some(min_beds) = self.min_beds {
            match record.beds {
                Some(beds) if beds >= min_beds => {}
                _ => return false,
            }
        }
        if let Some(min_baths) = self.min_baths {
            match record.bathrooms() {
                Some(baths) if baths >= min_baths => {}
                _ => return false,
            }
        }
        true
    }

    /// Keep the matching subsequence of `records`, original order preserved.
    pub fn apply(&self, records: Vec<PropertyRecord>) -> Vec<PropertyRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|record| self.matches(record)).collect()
    }
}
