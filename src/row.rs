use chrono::NaiveDateTime;
use serde_json::Value;

use crate::{Category, InvoiceId, ItemId};

/// A raw value that does not fit the column type it is written to
#[derive(Debug, thiserror::Error)]
#[error("Cannot coerce `{value}` to {expected}")]
pub struct CoercionError {
    expected: &'static str,
    value: Value,
}

impl CoercionError {
    /// The type the value was coerced to
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    /// The offending value
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Coerces a raw value into an integer column
///
/// Integers pass through, floats only if they carry no fractional part, and
/// strings if they hold an integer literal.
pub(crate) fn coerce_integer(value: &Value) -> Result<i64, CoercionError> {
    let coerced = match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };

    coerced.ok_or_else(|| CoercionError {
        expected: "an integer",
        value: value.clone(),
    })
}

/// Coerces a raw value into a string column
///
/// Scalars are rendered, `null` and nested values are rejected.
pub(crate) fn coerce_string(value: &Value) -> Result<String, CoercionError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(CoercionError {
            expected: "a string",
            value: value.clone(),
        }),
    }
}

/// One flattened invoice line item
///
/// Field order is the column order of the output table,
/// see [`OutputRow::HEADER`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OutputRow {
    invoice_id: InvoiceId,
    #[serde(serialize_with = "crate::invoice::timestamp::serialize")]
    created_on: NaiveDateTime,
    invoiceitem_id: ItemId,
    invoiceitem_name: String,
    #[serde(rename = "type")]
    category: Category,
    unit_price: i64,
    total_price: i64,
    percentage_in_invoice: f64,
    is_expired: bool,
}

impl OutputRow {
    /// The header row of the output table
    pub const HEADER: [&'static str; 9] = [
        "invoice_id",
        "created_on",
        "invoiceitem_id",
        "invoiceitem_name",
        "type",
        "unit_price",
        "total_price",
        "percentage_in_invoice",
        "is_expired",
    ];

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        invoice_id: InvoiceId,
        created_on: NaiveDateTime,
        invoiceitem_id: ItemId,
        invoiceitem_name: String,
        category: Category,
        unit_price: i64,
        total_price: i64,
        percentage_in_invoice: f64,
        is_expired: bool,
    ) -> Self {
        Self {
            invoice_id,
            created_on,
            invoiceitem_id,
            invoiceitem_name,
            category,
            unit_price,
            total_price,
            percentage_in_invoice,
            is_expired,
        }
    }

    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    pub fn created_on(&self) -> NaiveDateTime {
        self.created_on
    }

    pub fn invoiceitem_id(&self) -> ItemId {
        self.invoiceitem_id
    }

    pub fn invoiceitem_name(&self) -> &str {
        &self.invoiceitem_name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn unit_price(&self) -> i64 {
        self.unit_price
    }

    /// `unit_price * quantity`
    pub fn total_price(&self) -> i64 {
        self.total_price
    }

    /// The share of this line item in the total of its invoice
    pub fn percentage_in_invoice(&self) -> f64 {
        self.percentage_in_invoice
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn integers() {
        assert_eq!(coerce_integer(&json!(5)).unwrap(), 5);
        assert_eq!(coerce_integer(&json!(-12)).unwrap(), -12);
        assert_eq!(coerce_integer(&json!(5.0)).unwrap(), 5);
        assert_eq!(coerce_integer(&json!(" 42 ")).unwrap(), 42);
    }

    #[test]
    fn integer_rejects() {
        for value in [json!(5.5), json!("abc"), json!(""), json!(null), json!(true), json!([1]), json!({"a": 1}), json!(1e30)] {
            let error = coerce_integer(&value).unwrap_err();
            assert_eq!(error.expected(), "an integer");
            assert_eq!(error.value(), &value);
        }
    }

    #[test]
    fn integer_rejects_u64_beyond_i64() {
        assert!(coerce_integer(&json!(u64::MAX)).is_err());
    }

    #[test]
    fn strings() {
        assert_eq!(coerce_string(&json!("Bolt")).unwrap(), "Bolt");
        assert_eq!(coerce_string(&json!(12)).unwrap(), "12");
        assert_eq!(coerce_string(&json!(false)).unwrap(), "false");
        assert!(coerce_string(&json!(null)).is_err());
        assert!(coerce_string(&json!(["Bolt"])).is_err());
    }

    #[test]
    fn header_matches_serialized_field_names() {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(vec![]);
        let row = OutputRow::new(
            InvoiceId::new(1),
            crate::invoice::timestamp::parse("2024-01-01").unwrap(),
            ItemId::new(10),
            "Bolt".to_owned(),
            Category::Material,
            5,
            10,
            0.4,
            true,
        );
        writer.serialize(&row).unwrap();
        let written = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let mut lines = written.lines();
        assert_eq!(lines.next().unwrap(), OutputRow::HEADER.join(","));
        assert_eq!(lines.next().unwrap(), "1,2024-01-01 00:00:00,10,Bolt,Material,5,10,0.4,true");
        assert_eq!(lines.next(), None);
    }
}
