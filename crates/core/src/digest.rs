use std::fmt::Display;

use crate::domain::listing::PropertyRecord;

/// Render one record as a fixed-layout display block.
///
/// The layout and field order are stable: identifier line, style, address,
/// structure counts, prices, schools, URL, description. A missing field
/// renders as an empty substitution so a ragged record still produces a
/// complete block. Pure and deterministic.
pub fn format_listing(record: &PropertyRecord) -> String {
    let lines = [
        format!(
            "Listing {} | {}, {} {}",
            text(&record.mls_id),
            text(&record.street),
            text(&record.city),
            text(&record.zip_code)
        ),
        format!("Style: {}", text(&record.style)),
        format!("Street: {}", text(&record.street)),
        format!("Unit: {}", text(&record.unit)),
        format!("City: {}", text(&record.city)),
        format!("State: {}", text(&record.state)),
        format!("Zip: {}", text(&record.zip_code)),
        format!("Beds: {}", text(&record.beds)),
        format!("Stories: {}", text(&record.stories)),
        format!("Full baths: {}", text(&record.full_baths)),
        format!("Half baths: {}", text(&record.half_baths)),
        format!("Sqft: {}", text(&record.sqft)),
        format!("List price: {}", text(&record.list_price)),
        format!("Sold price: {}", text(&record.sold_price)),
        format!("Nearby schools: {}", text(&record.nearby_schools)),
        format!("URL: {}", text(&record.property_url)),
        format!("Description: {}", text(&record.description)),
    ];
    lines.join("\n")
}

/// Join the first `cap` record blocks with newlines.
pub fn render_digest(records: &[PropertyRecord], cap: usize) -> String {
    records.iter().take(cap).map(format_listing).collect::<Vec<_>>().join("\n")
}

fn text<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}
