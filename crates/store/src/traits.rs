//! The `RowStore` trait — the seam between dashboard queries and the store.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Query, StoreError};

/// A remote (or in-memory) tabular store that answers [`Query`]s.
///
/// Implementations hold no per-request state; one handle can serve any
/// number of concurrent callers.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Run `query` and return the projected rows as JSON objects.
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Count the rows `query` matches, ignoring its ordering and window.
    async fn count(&self, query: &Query) -> Result<u64, StoreError>;
}

/// Deserialize raw rows into typed records.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}
