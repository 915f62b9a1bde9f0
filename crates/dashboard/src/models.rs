//! Row and view types for the dashboard.
//!
//! Row types mirror what the store returns for a given projection; view
//! types are the shaped results handed to the UI.  Amounts on rows are
//! integer minor units (cents).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// revenue
// ---------------------------------------------------------------------------

/// One month of the revenue time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revenue {
    pub month: String,
    pub revenue: i64,
}

// ---------------------------------------------------------------------------
// invoices
// ---------------------------------------------------------------------------

/// Invoice status as stored.
///
/// Only `pending` and `paid` are expected; anything else is kept verbatim
/// and excluded from paid/pending totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Other(String),
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<String> for InvoiceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            _ => Self::Other(s),
        }
    }
}

impl From<InvoiceStatus> for String {
    fn from(status: InvoiceStatus) -> Self {
        status.to_string()
    }
}

/// The `(amount, status)` slice of an invoice used for totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAmount {
    pub amount: i64,
    pub status: InvoiceStatus,
}

/// Customer fields embedded in an invoice row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub name: String,
    pub email: String,
    pub image_url: String,
}

/// Latest-invoices card entry: customer fields flattened, amount formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestInvoiceView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub amount: String,
}

/// Invoice table row, passed through as the store returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredInvoiceRow {
    pub id: Uuid,
    pub amount: i64,
    pub date: NaiveDate,
    pub status: InvoiceStatus,
    #[serde(rename = "customers")]
    pub customer: CustomerRef,
}

/// A single invoice for the edit form, amount in major units (dollars).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDetail {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: f64,
    pub status: InvoiceStatus,
}

/// Dashboard summary cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    pub number_of_customers: u64,
    pub number_of_invoices: u64,
    pub total_paid_invoices: String,
    pub total_pending_invoices: String,
}

// ---------------------------------------------------------------------------
// customers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

/// Customer picker entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerField {
    pub id: Uuid,
    pub name: String,
}

/// Customer table row with per-customer invoice rollups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    #[serde(flatten)]
    pub customer: Customer,
    pub total_invoices: usize,
    pub total_pending: String,
    pub total_paid: String,
}
