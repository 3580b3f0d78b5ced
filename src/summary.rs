use std::collections::BTreeMap;

use crate::{InvoiceId, OutputRow};

/// Per invoice aggregate over flattened rows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InvoiceSummary {
    rows: usize,
    total: i64,
    is_expired: bool,
}

impl InvoiceSummary {
    /// The number of line items
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The sum of all line item totals
    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired
    }
}

/// Groups flattened rows by invoice and rebuilds each invoice's total
pub fn summarize<'a, I>(rows: I) -> BTreeMap<InvoiceId, InvoiceSummary>
where
    I: IntoIterator<Item = &'a OutputRow>,
{
    rows.into_iter().fold(BTreeMap::new(), |mut summaries, row| {
        let summary: &mut InvoiceSummary = summaries.entry(row.invoice_id()).or_default();
        summary.rows += 1;
        summary.total = summary.total.saturating_add(row.total_price());
        summary.is_expired |= row.is_expired();
        summaries
    })
}
