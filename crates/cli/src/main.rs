//! `invoice-dashboard` CLI entry-point.
//!
//! Runs one dashboard query against the hosted store and prints the result
//! as JSON.  Available sub-commands:
//! - `revenue`         — the revenue time series.
//! - `latest-invoices` — the five most recent invoices.
//! - `cards`           — counts and paid/pending totals.
//! - `invoices`        — one page of the filtered invoice table.
//! - `invoice-pages`   — number of pages for a filter.
//! - `invoice`         — a single invoice by id.
//! - `customers`       — every customer's id and name.
//! - `customer-table`  — filtered customers with invoice rollups.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use dashboard::QueryFacade;
use store::{HttpStore, StoreConfig};

#[derive(Parser)]
#[command(
    name = "invoice-dashboard",
    about = "Query dashboard data from the hosted invoice store",
    version
)]
struct Cli {
    /// Base URL of the hosted store.
    #[arg(long, env = "SUPABASE_URL")]
    url: String,

    /// Anonymous access key for the hosted store.
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    anon_key: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the revenue time series.
    Revenue,
    /// Print the five most recent invoices.
    LatestInvoices,
    /// Print invoice/customer counts and paid/pending totals.
    Cards,
    /// Print one page of invoices matching a customer name or email.
    Invoices {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Print the number of invoice pages matching a customer name or email.
    InvoicePages {
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Print a single invoice.
    Invoice {
        id: Uuid,
    },
    /// Print every customer's id and name.
    Customers,
    /// Print customers matching a name or email, with invoice totals.
    CustomerTable {
        #[arg(long, default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = StoreConfig::new(&cli.url, cli.anon_key)?;
    info!("Querying store at {}", config.url);
    let facade = QueryFacade::new(HttpStore::new(config)?);

    match cli.command {
        Command::Revenue => print(&facade.get_revenue().await?),
        Command::LatestInvoices => print(&facade.get_latest_invoices().await?),
        Command::Cards => print(&facade.get_card_summary().await?),
        Command::Invoices { query, page } => {
            print(&facade.get_filtered_invoices(&query, page).await?)
        }
        Command::InvoicePages { query } => print(&facade.get_invoice_page_count(&query).await?),
        Command::Invoice { id } => print(&facade.get_invoice_by_id(id).await?),
        Command::Customers => print(&facade.get_all_customers().await?),
        Command::CustomerTable { query } => print(&facade.get_filtered_customers(&query).await?),
    }
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode result")?;
    println!("{json}");
    Ok(())
}
