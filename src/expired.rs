use std::collections::HashSet;

use crate::InvoiceId;

/// Possible errors to occur while reading the list of expired invoices
#[derive(Debug, thiserror::Error)]
pub enum ExpiredListError {
    #[error("Entry {position} of the expired invoice list is not an invoice id: `{token}`")]
    Malformed {
        token: String,
        position: usize,
    },
}

/// The ids of all invoices that are expired
///
/// Expired invoices are flagged in the output, but not excluded from it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpiredSet(HashSet<InvoiceId>);

impl ExpiredSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    /// Parses a comma separated list of invoice ids
    ///
    /// Whitespace around entries is ignored and a blank text is an empty list.
    /// Every other entry, including empty ones between two commas, must be an
    /// integer invoice id.
    pub fn parse(text: &str) -> Result<Self, ExpiredListError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::new());
        }

        text.split(',')
            .map(str::trim)
            .enumerate()
            .map(|(position, token)| {
                token
                    .parse()
                    .map(InvoiceId::new)
                    .map_err(|_| ExpiredListError::Malformed {
                        token: token.to_owned(),
                        position,
                    })
            })
            .collect()
    }

    pub fn contains(&self, id: InvoiceId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<InvoiceId> for ExpiredSet {
    fn from_iter<I: IntoIterator<Item = InvoiceId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
