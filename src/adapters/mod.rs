//! External integrations
//!
//! Adapters isolate the pipeline from the wire details of external
//! services. Only the Elasticsearch-compatible document store is adapted.

pub mod elasticsearch;
