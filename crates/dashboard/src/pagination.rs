//! Page math for invoice listings.

/// Rows per page of the invoice table.
pub const ITEMS_PER_PAGE: usize = 6;

/// Row offset of a 1-based page.  Pages below 1 are treated as page 1.
pub fn page_offset(page: u32) -> usize {
    (page.max(1) as usize - 1) * ITEMS_PER_PAGE
}

/// Number of pages needed to show `total` rows.
pub fn page_count(total: u64) -> u64 {
    total.div_ceil(ITEMS_PER_PAGE as u64)
}
