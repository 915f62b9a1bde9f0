//! `store` crate — client side of the hosted relational store.
//!
//! Provides a typed query model, its PostgREST rendering, an HTTP client and
//! an in-memory implementation behind the same [`RowStore`] trait.  No
//! dashboard logic lives here.

pub mod error;
pub mod query;
pub mod traits;
pub mod client;
pub mod memory;

pub use error::StoreError;
pub use query::{Column, Direction, Filter, Query};
pub use traits::{decode_rows, RowStore};
pub use client::{HttpStore, StoreConfig};
pub use memory::MemoryStore;
