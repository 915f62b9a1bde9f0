//! Errors surfaced to dashboard callers.

use thiserror::Error;

/// A failed dashboard query.
///
/// One variant per facade operation, each carrying only a fixed message.
/// The underlying store error is logged where it happens and never reaches
/// the caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    #[error("Failed to fetch revenue data.")]
    Revenue,

    #[error("Failed to fetch the latest invoices.")]
    LatestInvoices,

    #[error("Failed to fetch card data.")]
    CardData,

    #[error("Failed to fetch invoices.")]
    Invoices,

    #[error("Failed to fetch total number of invoices.")]
    InvoicePages,

    #[error("Failed to fetch invoice.")]
    Invoice,

    #[error("Failed to fetch all customers.")]
    AllCustomers,

    #[error("Failed to fetch customer table.")]
    CustomerTable,
}
