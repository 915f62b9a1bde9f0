//! `dashboard` crate — dashboard data access over the hosted store.
//!
//! [`QueryFacade`] turns each dashboard data need into store queries and
//! shapes the rows for display: currency formatting, pagination math and
//! paid/pending aggregation.

pub mod models;
pub mod error;
pub mod currency;
pub mod pagination;
pub mod aggregate;
pub mod facade;

pub use models::{
    CardSummary, Customer, CustomerField, CustomerRef, CustomerSummary, FilteredInvoiceRow,
    InvoiceAmount, InvoiceDetail, InvoiceStatus, LatestInvoiceView, Revenue,
};
pub use error::FetchError;
pub use currency::format_currency;
pub use pagination::ITEMS_PER_PAGE;
pub use facade::QueryFacade;
