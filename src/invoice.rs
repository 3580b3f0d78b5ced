use chrono::NaiveDateTime;

/// The unique identifier of an invoice
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvoiceId(i64);

impl InvoiceId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// The unique identifier of an invoice item
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(i64);

impl ItemId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// The category an invoice item is booked under
#[derive(Clone, Copy, Debug, serde::Serialize, PartialEq, Eq)]
pub enum Category {
    /// Code `0`
    Material,
    /// Code `1`
    Equipment,
    /// Code `2`
    Service,
    /// Code `3`
    Other,
}

impl Category {
    /// Maps a raw type code to its category
    /// Returns `None` for codes outside of `0..=3`
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Material),
            1 => Some(Self::Equipment),
            2 => Some(Self::Service),
            3 => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Material => "Material",
            Self::Equipment => "Equipment",
            Self::Service => "Service",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchasable item as it appears on an invoice
///
/// The name, type code and unit price are kept as they were read. They are
/// only validated and coerced once the item gets flattened, so that a bad
/// value can be reported together with the invoice it belongs to.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Item {
    id: ItemId,
    name: serde_json::Value,
    #[serde(rename = "type")]
    type_code: serde_json::Value,
    unit_price: serde_json::Value,
}

impl Item {
    pub fn new(
        id: ItemId,
        name: impl Into<serde_json::Value>,
        type_code: impl Into<serde_json::Value>,
        unit_price: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            type_code: type_code.into(),
            unit_price: unit_price.into(),
        }
    }

    /// The unique id of the item
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// The raw name
    pub fn name(&self) -> &serde_json::Value {
        &self.name
    }

    /// The raw type code
    /// See [`Category::from_code`]
    pub fn type_code(&self) -> &serde_json::Value {
        &self.type_code
    }

    /// The raw unit price
    pub fn unit_price(&self) -> &serde_json::Value {
        &self.unit_price
    }
}

/// One entry of an invoice
#[derive(Clone, Debug, serde::Deserialize)]
pub struct LineItem {
    item: Item,
    quantity: i64,
}

impl LineItem {
    pub fn new(item: Item, quantity: i64) -> Self {
        Self { item, quantity }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }
}

/// An invoice
///
/// Invoices are billing documents consisting of one or more line items.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    #[serde(deserialize_with = "timestamp::deserialize")]
    created_on: NaiveDateTime,
    items: Vec<LineItem>,
}

impl Invoice {
    pub fn new(id: InvoiceId, created_on: NaiveDateTime, items: Vec<LineItem>) -> Self {
        Self { id, created_on, items }
    }

    /// The unique id of the invoice
    pub fn id(&self) -> InvoiceId {
        self.id
    }

    /// The point in time the invoice was created at
    pub fn created_on(&self) -> NaiveDateTime {
        self.created_on
    }

    /// The line items in source order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }
}

/// Lenient timestamp parsing for `created_on`
///
/// Offsets are normalized to UTC and then dropped, a bare date means midnight.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::Deserialize;

    const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    const DATE_FORMAT: &str = "%Y-%m-%d";

    // the fraction is left out entirely for whole seconds
    pub(crate) const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub(crate) fn parse(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
            return Some(timestamp.naive_utc());
        }

        DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| {
            serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(&s),
                &"an RFC 3339 timestamp, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`",
            )
        })
    }

    pub(crate) fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&timestamp.format(OUTPUT_FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! timestamp_test {
        ($name:ident $input:literal => $expected:literal) => {
            #[test]
            fn $name() {
                let parsed = timestamp::parse($input).unwrap();
                assert_eq!(
                    parsed.format(timestamp::OUTPUT_FORMAT).to_string(),
                    $expected,
                );
            }
        };
    }

    timestamp_test!(bare_date "2024-01-01" => "2024-01-01 00:00:00");
    timestamp_test!(space_separated "2024-01-01 13:45:10" => "2024-01-01 13:45:10");
    timestamp_test!(t_separated "2024-01-01T13:45:10" => "2024-01-01 13:45:10");
    timestamp_test!(fractional_seconds "2024-01-01T13:45:10.250" => "2024-01-01 13:45:10.250");
    timestamp_test!(microseconds "2024-01-01 13:45:10.000250" => "2024-01-01 13:45:10.000250");
    timestamp_test!(utc_offset "2024-01-01T13:45:10Z" => "2024-01-01 13:45:10");
    timestamp_test!(positive_offset "2024-01-01T01:00:00+02:00" => "2023-12-31 23:00:00");
    timestamp_test!(surrounding_whitespace " 2024-01-01 " => "2024-01-01 00:00:00");

    #[test]
    fn garbage_timestamp() {
        assert!(timestamp::parse("yesterday").is_none());
        assert!(timestamp::parse("2024-13-01").is_none());
    }

    #[test]
    fn deserialize_invoice() {
        let invoice: Invoice = serde_json::from_str(
            r#"{
                "id": 7,
                "created_on": "2024-02-29 08:00:00",
                "items": [
                    {"item": {"id": 3, "name": "Bolt", "type": 0, "unit_price": 5}, "quantity": 2}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(invoice.id(), InvoiceId::new(7));
        assert_eq!(invoice.items().len(), 1);

        let line = &invoice.items()[0];
        assert_eq!(line.quantity(), 2);
        assert_eq!(line.item().id(), ItemId::new(3));
        assert_eq!(line.item().type_code(), &serde_json::json!(0));
        assert_eq!(line.item().name(), &serde_json::json!("Bolt"));
        assert_eq!(line.item().unit_price(), &serde_json::json!(5));
    }

    #[test]
    fn negative_ids() {
        let invoice: Invoice = serde_json::from_str(
            r#"{"id": -1, "created_on": "2024-01-01", "items": [
                {"item": {"id": -20, "name": "Bolt", "type": 0, "unit_price": 5}, "quantity": 1}
            ]}"#,
        )
        .unwrap();

        assert_eq!(invoice.id(), InvoiceId::new(-1));
        assert_eq!(invoice.items()[0].item().id(), ItemId::new(-20));
    }

    #[test]
    fn reject_unparseable_created_on() {
        let result = serde_json::from_str::<Invoice>(
            r#"{"id": 1, "created_on": "soon", "items": []}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn category_codes() {
        assert_eq!(Category::from_code(0), Some(Category::Material));
        assert_eq!(Category::from_code(1), Some(Category::Equipment));
        assert_eq!(Category::from_code(2), Some(Category::Service));
        assert_eq!(Category::from_code(3), Some(Category::Other));
        assert_eq!(Category::from_code(4), None);
        assert_eq!(Category::from_code(-1), None);
        assert_eq!(Category::Equipment.to_string(), "Equipment");
    }
}
