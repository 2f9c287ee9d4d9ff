//! Elasticsearch adapter
//!
//! The document store is consumed through two interfaces only: paginated
//! scroll retrieval of documents by index name, and additive partial
//! updates via the `_bulk` endpoint.

pub mod client;
pub mod models;

pub use client::EsClient;
pub use models::{BulkResponse, Hit, SearchResponse};
