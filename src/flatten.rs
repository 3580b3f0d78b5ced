use crate::{
    row::{coerce_integer, coerce_string},
    Category, CoercionError, ExpiredSet, Invoice, InvoiceId, ItemId, OutputRow,
};

/// Possible errors to occur while flattening an invoice
#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    #[error("The line items of invoice {invoice} add up to zero, their shares are undefined")]
    DivisionByZero {
        invoice: InvoiceId,
    },
    #[error("Item {item} has the unknown type code {code}")]
    UnknownCategory {
        code: i64,
        item: ItemId,
    },
    #[error("Invalid `{field}` of item {item} on invoice {invoice}: {source}")]
    TypeCoercion {
        field: &'static str,
        invoice: InvoiceId,
        item: ItemId,
        #[source]
        source: CoercionError,
    },
    #[error("The price of item {item} on invoice {invoice} overflows")]
    AmountOverflow {
        invoice: InvoiceId,
        item: ItemId,
    },
}

/// A validated line item whose share in the invoice is still unknown
struct PricedLine {
    item: ItemId,
    name: String,
    category: Category,
    unit_price: i64,
    total_price: i64,
}

/// Turns invoices into a flat table of line items
///
/// Rows are collected across invoices and only sorted once the flattener is
/// finished, see [`Flattener::finish`].
#[derive(Debug)]
pub struct Flattener<'a> {
    /// The invoices to flag as expired
    expired: &'a ExpiredSet,
    /// All rows flattened so far, in arrival order
    rows: Vec<OutputRow>,
}

impl<'a> Flattener<'a> {
    /// Creates a new flattener that flags the invoices in `expired`
    pub fn new(expired: &'a ExpiredSet) -> Self {
        Self {
            expired,
            rows: Vec::new(),
        }
    }

    /// The rows flattened so far, in arrival order
    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    /// Flattens one invoice into one row per line item
    ///
    /// Either all line items of the invoice are added, or none of them are and
    /// an error is returned. Invoices without line items add no rows.
    pub fn handle_invoice(&mut self, invoice: Invoice) -> Result<(), FlattenError> {
        let invoice_id = invoice.id();
        let lines = invoice
            .items()
            .iter()
            .map(|line| -> Result<PricedLine, FlattenError> {
                let item = line.item();
                let coercion_error = |field: &'static str| {
                    move |source: CoercionError| FlattenError::TypeCoercion {
                        field,
                        invoice: invoice_id,
                        item: item.id(),
                        source,
                    }
                };
                let code = coerce_integer(item.type_code()).map_err(coercion_error("type"))?;
                let category = Category::from_code(code)
                    .ok_or(FlattenError::UnknownCategory {
                        code,
                        item: item.id(),
                    })?;
                let name = coerce_string(item.name()).map_err(coercion_error("invoiceitem_name"))?;
                let unit_price = coerce_integer(item.unit_price()).map_err(coercion_error("unit_price"))?;
                let total_price = unit_price
                    .checked_mul(line.quantity())
                    .ok_or(FlattenError::AmountOverflow {
                        invoice: invoice_id,
                        item: item.id(),
                    })?;

                Ok(PricedLine {
                    item: item.id(),
                    name,
                    category,
                    unit_price,
                    total_price,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if lines.is_empty() {
            tracing::debug!(invoice = %invoice_id, "invoice has no line items");
            return Ok(());
        }

        let invoice_total = lines
            .iter()
            .try_fold(0i64, |total, line| {
                total.checked_add(line.total_price).ok_or(FlattenError::AmountOverflow {
                    invoice: invoice_id,
                    item: line.item,
                })
            })?;
        if invoice_total == 0 {
            return Err(FlattenError::DivisionByZero { invoice: invoice_id });
        }

        let created_on = invoice.created_on();
        let is_expired = self.expired.contains(invoice_id);
        tracing::debug!(
            invoice = %invoice_id,
            lines = lines.len(),
            total = invoice_total,
            is_expired,
            "flattened invoice"
        );

        self.rows.extend(lines.into_iter().map(|line| {
            OutputRow::new(
                invoice_id,
                created_on,
                line.item,
                line.name,
                line.category,
                line.unit_price,
                line.total_price,
                line.total_price as f64 / invoice_total as f64,
                is_expired,
            )
        }));

        Ok(())
    }

    /// Consumes the flattener and returns all rows
    /// sorted by invoice id, then invoice item id
    pub fn finish(self) -> Vec<OutputRow> {
        let mut rows = self.rows;
        // stable, so repeated item ids keep their source order
        rows.sort_by_key(|row| (row.invoice_id(), row.invoiceitem_id()));
        rows
    }
}

/// Flattens all invoices into one sorted table
///
/// The first invoice that cannot be flattened aborts the whole run.
pub fn flatten<I>(invoices: I, expired: &ExpiredSet) -> Result<Vec<OutputRow>, FlattenError>
where
    I: IntoIterator<Item = Invoice>,
{
    let mut flattener = Flattener::new(expired);

    for invoice in invoices {
        let invoice_id = invoice.id();
        if let Err(error) = flattener.handle_invoice(invoice) {
            tracing::warn!(invoice = %invoice_id, %error, "aborting, invoice cannot be flattened");
            return Err(error);
        }
    }

    Ok(flattener.finish())
}
