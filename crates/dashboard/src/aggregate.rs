//! Paid/pending rollups over invoice amounts.

use crate::models::{InvoiceAmount, InvoiceStatus};

/// Sums per status, in minor units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusTotals {
    /// Every invoice seen, whatever its status.
    pub invoices: usize,
    pub paid: i64,
    pub pending: i64,
}

impl StatusTotals {
    pub fn add(&mut self, invoice: &InvoiceAmount) {
        self.invoices += 1;
        match invoice.status {
            InvoiceStatus::Paid => self.paid += invoice.amount,
            InvoiceStatus::Pending => self.pending += invoice.amount,
            InvoiceStatus::Other(_) => {}
        }
    }
}

impl<'a> FromIterator<&'a InvoiceAmount> for StatusTotals {
    fn from_iter<I: IntoIterator<Item = &'a InvoiceAmount>>(iter: I) -> Self {
        let mut totals = Self::default();
        for invoice in iter {
            totals.add(invoice);
        }
        totals
    }
}
