//! Record types flowing out of extraction.
//!
//! Internally every extracted field is an `Option<String>` so downstream
//! logic can distinguish "missing" from a literal string. The fixed
//! placeholder sentinels are substituted only when a record crosses the
//! external boundary as a [`ResultRow`].

use serde::{Deserialize, Serialize};

// =============================================================================
// Placeholder sentinels
// =============================================================================

/// Substituted for a provider name that could not be extracted.
pub const PROVIDER_UNAVAILABLE: &str = "provider info unavailable";
/// Substituted for a location that could not be extracted.
pub const LOCATION_UNAVAILABLE: &str = "location info unavailable";
/// Substituted for an event title that could not be extracted.
pub const EVENT_UNAVAILABLE: &str = "event info unavailable";
/// Substituted for an option name that could not be extracted.
pub const OPTION_UNAVAILABLE: &str = "option info unavailable";
/// Substituted for an option price that could not be extracted.
pub const PRICE_UNAVAILABLE: &str = "price info unavailable";
/// Substituted for the aggregate metrics and the detail URL.
pub const NOT_AVAILABLE: &str = "N/A";

fn or_sentinel(value: Option<String>, sentinel: &str) -> String {
    value.unwrap_or_else(|| sentinel.to_string())
}

// =============================================================================
// Internal records
// =============================================================================

/// One promotional listing entry, as extracted from its detail view.
///
/// `None` means the field's selector fallback chain was exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub provider_name: Option<String>,
    pub location: Option<String>,
    pub event_title: Option<String>,
    pub rating: Option<String>,
    pub review_count: Option<String>,
    pub scrap_count: Option<String>,
    pub inquiry_count: Option<String>,
    pub detail_url: Option<String>,
}

/// One purchasable variant of an event, denormalized: the row carries a full
/// copy of the parent event's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRecord {
    pub event: EventRecord,
    pub option_name: Option<String>,
    pub option_price: Option<String>,
}

impl OptionRecord {
    /// Row emitted when option discovery failed entirely for an item.
    pub fn placeholder(event: EventRecord) -> Self {
        Self {
            event,
            option_name: None,
            option_price: None,
        }
    }

    /// Convert to the external row shape, substituting sentinels for
    /// missing fields.
    pub fn into_row(self) -> ResultRow {
        ResultRow {
            provider_name: or_sentinel(self.event.provider_name, PROVIDER_UNAVAILABLE),
            location: or_sentinel(self.event.location, LOCATION_UNAVAILABLE),
            event_title: or_sentinel(self.event.event_title, EVENT_UNAVAILABLE),
            option_name: or_sentinel(self.option_name, OPTION_UNAVAILABLE),
            option_price: or_sentinel(self.option_price, PRICE_UNAVAILABLE),
            rating: or_sentinel(self.event.rating, NOT_AVAILABLE),
            review_count: or_sentinel(self.event.review_count, NOT_AVAILABLE),
            scrap_count: or_sentinel(self.event.scrap_count, NOT_AVAILABLE),
            inquiry_count: or_sentinel(self.event.inquiry_count, NOT_AVAILABLE),
            detail_url: or_sentinel(self.event.detail_url, NOT_AVAILABLE),
        }
    }
}

/// Apply the placeholder-row invariant: every processed item yields at least
/// one option row, even when option discovery came up empty.
pub fn rows_for_item(event: EventRecord, options: Vec<OptionRecord>) -> Vec<OptionRecord> {
    if options.is_empty() {
        vec![OptionRecord::placeholder(event)]
    } else {
        options
    }
}

// =============================================================================
// External result table
// =============================================================================

/// One row of the final table. All columns are strings; numeric coercion is
/// the consumer's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub provider_name: String,
    pub location: String,
    pub event_title: String,
    pub option_name: String,
    pub option_price: String,
    pub rating: String,
    pub review_count: String,
    pub scrap_count: String,
    pub inquiry_count: String,
    pub detail_url: String,
}

/// The ordered sequence of all option rows across processed items, and the
/// sole artifact exposed downstream. Insertion order follows listing order, or
/// worker-completion order in pooled mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    /// Append all rows extracted from one item.
    pub fn extend_from_item(&mut self, records: Vec<OptionRecord>) {
        self.rows.extend(records.into_iter().map(OptionRecord::into_row));
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> EventRecord {
        EventRecord {
            provider_name: Some("Bright Clinic".into()),
            location: Some("Gangnam".into()),
            event_title: Some("Laser toning 10 sessions".into()),
            rating: Some("4.8".into()),
            review_count: Some("1,024".into()),
            scrap_count: Some("310".into()),
            inquiry_count: Some("57".into()),
            detail_url: Some("https://www.yeoshin.co.kr/events/1234".into()),
        }
    }

    #[test]
    fn placeholder_row_invariant_holds_for_empty_options() {
        let rows = rows_for_item(sample_event(), Vec::new());
        assert_eq!(rows.len(), 1);
        let row = rows[0].clone().into_row();
        assert_eq!(row.option_name, OPTION_UNAVAILABLE);
        assert_eq!(row.option_price, PRICE_UNAVAILABLE);
        // the event fields survive untouched
        assert_eq!(row.provider_name, "Bright Clinic");
    }

    #[test]
    fn extracted_options_pass_through_unchanged() {
        let event = sample_event();
        let options = vec![
            OptionRecord {
                event: event.clone(),
                option_name: Some("1 session".into()),
                option_price: Some("50,000".into()),
            },
            OptionRecord {
                event: event.clone(),
                option_name: Some("10 sessions".into()),
                option_price: Some("390,000".into()),
            },
        ];
        let rows = rows_for_item(event, options);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].option_name.as_deref(), Some("10 sessions"));
    }

    #[test]
    fn sentinels_substituted_only_at_the_boundary() {
        let record = OptionRecord::placeholder(EventRecord::default());
        // internal representation keeps None
        assert!(record.event.provider_name.is_none());
        assert!(record.option_name.is_none());

        let row = record.into_row();
        assert_eq!(row.provider_name, PROVIDER_UNAVAILABLE);
        assert_eq!(row.location, LOCATION_UNAVAILABLE);
        assert_eq!(row.event_title, EVENT_UNAVAILABLE);
        assert_eq!(row.rating, NOT_AVAILABLE);
        assert_eq!(row.review_count, NOT_AVAILABLE);
        assert_eq!(row.scrap_count, NOT_AVAILABLE);
        assert_eq!(row.inquiry_count, NOT_AVAILABLE);
        assert_eq!(row.detail_url, NOT_AVAILABLE);
    }

    #[test]
    fn table_preserves_insertion_order() {
        let mut table = ResultTable::new();
        for i in 0..3 {
            let mut event = sample_event();
            event.event_title = Some(format!("event {i}"));
            table.extend_from_item(rows_for_item(event, Vec::new()));
        }
        let titles: Vec<_> = table.rows().iter().map(|r| r.event_title.clone()).collect();
        assert_eq!(titles, vec!["event 0", "event 1", "event 2"]);
    }
}
