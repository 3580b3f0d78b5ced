pub use self::{
    expired::{ExpiredListError, ExpiredSet},
    flatten::{flatten, FlattenError, Flattener},
    invoice::{Category, Invoice, InvoiceId, Item, ItemId, LineItem},
    row::{CoercionError, OutputRow},
    summary::{summarize, InvoiceSummary},
};

pub mod io;

mod expired;
mod flatten;
mod invoice;
mod row;
mod summary;
