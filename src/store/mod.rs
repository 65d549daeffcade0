//! Object-store access layer.
//!
//! Handlers never talk to a concrete store. They hand per-request
//! credentials to a [`StoreConnector`], which yields a bucket-scoped
//! [`ObjectStore`] client for exactly that call. Nothing credential-derived
//! is cached between requests, so one process can serve many tenants.

pub mod memory;
pub mod s3;
pub mod traits;

pub use memory::MemoryConnector;
pub use s3::S3Connector;
pub use traits::{
    FlatListing, HierarchicalListing, ObjectStore, ObjectSummary, PutOutcome, StoreConnector,
    StoreCredentials, StoreError,
};
