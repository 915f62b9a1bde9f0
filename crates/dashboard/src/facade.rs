//! Dashboard query facade.
//!
//! `QueryFacade` exposes one async method per dashboard data need:
//! 1. Builds the store query, pushing filter, sort and pagination down.
//! 2. Runs it (several queries run one after another, never concurrently).
//! 3. Shapes the rows: flattening, currency formatting, rollups.
//! 4. On any store failure, logs the cause and returns the operation's
//!    generic [`FetchError`].

use std::future::Future;

use serde::Deserialize;
use tracing::{error, info, instrument};
use uuid::Uuid;

use store::{decode_rows, Direction, Query, RowStore, StoreError};

use crate::aggregate::StatusTotals;
use crate::currency::{format_currency, to_major_units};
use crate::models::{
    CardSummary, Customer, CustomerField, CustomerRef, CustomerSummary, FilteredInvoiceRow,
    InvoiceAmount, InvoiceDetail, InvoiceStatus, LatestInvoiceView, Revenue,
};
use crate::pagination::{page_count, page_offset, ITEMS_PER_PAGE};
use crate::FetchError;

const REVENUE: &str = "revenue";
const INVOICES: &str = "invoices";
const CUSTOMERS: &str = "customers";

/// Number of invoices on the latest-invoices card.
pub const LATEST_INVOICES: usize = 5;

// ---------------------------------------------------------------------------
// Raw rows only the facade needs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LatestInvoiceRow {
    id: Uuid,
    amount: i64,
    customers: CustomerRef,
}

#[derive(Debug, Deserialize)]
struct InvoiceRecord {
    id: Uuid,
    customer_id: Uuid,
    amount: i64,
    status: InvoiceStatus,
}

#[derive(Debug, Deserialize)]
struct CustomerWithInvoices {
    #[serde(flatten)]
    customer: Customer,
    invoices: Vec<InvoiceAmount>,
}

// ---------------------------------------------------------------------------
// QueryFacade
// ---------------------------------------------------------------------------

/// Stateless query layer over a [`RowStore`].
///
/// Holds nothing but the store handle, so one facade can serve any number
/// of concurrent callers.
pub struct QueryFacade<S> {
    store: S,
}

impl<S: RowStore> QueryFacade<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The full revenue time series.
    #[instrument(skip(self))]
    pub async fn get_revenue(&self) -> Result<Vec<Revenue>, FetchError> {
        guarded(FetchError::Revenue, async {
            info!("fetching revenue data");
            let rows = self.store.select(&Query::table(REVENUE).select(&["*"])).await?;
            decode_rows(rows)
        })
        .await
    }

    /// The five most recent invoices with their customer.
    #[instrument(skip(self))]
    pub async fn get_latest_invoices(&self) -> Result<Vec<LatestInvoiceView>, FetchError> {
        guarded(FetchError::LatestInvoices, async {
            let query = Query::table(INVOICES)
                .select(&["amount", "id"])
                .embed(CUSTOMERS, &["name", "image_url", "email"])
                .order("date", Direction::Desc)
                .limit(LATEST_INVOICES);

            let rows: Vec<LatestInvoiceRow> = decode_rows(self.store.select(&query).await?)?;

            Ok::<_, StoreError>(rows
                .into_iter()
                .map(|row| LatestInvoiceView {
                    id: row.id,
                    name: row.customers.name,
                    email: row.customers.email,
                    image_url: row.customers.image_url,
                    amount: format_currency(row.amount),
                })
                .collect())
        })
        .await
    }

    /// Invoice and customer counts plus paid/pending totals.
    ///
    /// Three queries, run in order; any failure fails the whole summary.
    #[instrument(skip(self))]
    pub async fn get_card_summary(&self) -> Result<CardSummary, FetchError> {
        guarded(FetchError::CardData, async {
            let number_of_invoices = self.store.count(&Query::table(INVOICES)).await?;
            let number_of_customers = self.store.count(&Query::table(CUSTOMERS)).await?;

            let rows = self
                .store
                .select(&Query::table(INVOICES).select(&["amount", "status"]))
                .await?;
            let invoices: Vec<InvoiceAmount> = decode_rows(rows)?;
            let totals: StatusTotals = invoices.iter().collect();

            Ok::<_, StoreError>(CardSummary {
                number_of_customers,
                number_of_invoices,
                total_paid_invoices: format_currency(totals.paid),
                total_pending_invoices: format_currency(totals.pending),
            })
        })
        .await
    }

    /// One page of invoices whose customer name or email contains `query`,
    /// most recent first.  `current_page` is 1-based.
    #[instrument(skip(self))]
    pub async fn get_filtered_invoices(
        &self,
        query: &str,
        current_page: u32,
    ) -> Result<Vec<FilteredInvoiceRow>, FetchError> {
        guarded(FetchError::Invoices, async {
            let store_query =
                filtered_invoices(query).range(page_offset(current_page), ITEMS_PER_PAGE);
            decode_rows(self.store.select(&store_query).await?)
        })
        .await
    }

    /// Number of pages [`QueryFacade::get_filtered_invoices`] can return for
    /// `query`.
    #[instrument(skip(self))]
    pub async fn get_invoice_page_count(&self, query: &str) -> Result<u64, FetchError> {
        guarded(FetchError::InvoicePages, async {
            let total = self.store.count(&filtered_invoices(query)).await?;
            Ok::<_, StoreError>(page_count(total))
        })
        .await
    }

    /// A single invoice with its amount in dollars.
    #[instrument(skip(self))]
    pub async fn get_invoice_by_id(&self, id: Uuid) -> Result<InvoiceDetail, FetchError> {
        guarded(FetchError::Invoice, async {
            let query = Query::table(INVOICES)
                .select(&["id", "customer_id", "amount", "status"])
                .eq("id", id);

            let row = self
                .store
                .select(&query)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| StoreError::NotFound {
                    table: INVOICES.to_owned(),
                })?;
            let record: InvoiceRecord = serde_json::from_value(row)?;

            Ok::<_, StoreError>(InvoiceDetail {
                id: record.id,
                customer_id: record.customer_id,
                amount: to_major_units(record.amount),
                status: record.status,
            })
        })
        .await
    }

    /// Every customer's id and name, sorted by name.
    #[instrument(skip(self))]
    pub async fn get_all_customers(&self) -> Result<Vec<CustomerField>, FetchError> {
        guarded(FetchError::AllCustomers, async {
            let query = Query::table(CUSTOMERS)
                .select(&["id", "name"])
                .order("name", Direction::Asc);
            decode_rows(self.store.select(&query).await?)
        })
        .await
    }

    /// Customers whose name or email contains `query`, with invoice counts
    /// and paid/pending totals.
    #[instrument(skip(self))]
    pub async fn get_filtered_customers(
        &self,
        query: &str,
    ) -> Result<Vec<CustomerSummary>, FetchError> {
        guarded(FetchError::CustomerTable, async {
            let store_query = Query::table(CUSTOMERS)
                .select(&["id", "name", "email", "image_url"])
                .embed(INVOICES, &["id", "amount", "status"])
                .contains_any(&["name", "email"], query);

            let rows: Vec<CustomerWithInvoices> =
                decode_rows(self.store.select(&store_query).await?)?;

            Ok::<_, StoreError>(rows
                .into_iter()
                .map(|row| {
                    let totals: StatusTotals = row.invoices.iter().collect();
                    CustomerSummary {
                        customer: row.customer,
                        total_invoices: totals.invoices,
                        total_pending: format_currency(totals.pending),
                        total_paid: format_currency(totals.paid),
                    }
                })
                .collect())
        })
        .await
    }
}

/// Invoices joined to customers matching `needle`, newest first.
fn filtered_invoices(needle: &str) -> Query {
    Query::table(INVOICES)
        .select(&["id", "amount", "date", "status"])
        .embed_inner(CUSTOMERS, &["name", "email", "image_url"])
        .contains_any_in(CUSTOMERS, &["name", "email"], needle)
        .order("date", Direction::Desc)
}

/// Await `body`; on failure log the store error and return `failure`.
async fn guarded<T, F>(failure: FetchError, body: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    body.await.map_err(|err| {
        error!(operation = ?failure, error = %err, "Database Error");
        failure
    })
}
