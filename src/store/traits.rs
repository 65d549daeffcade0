//! Store abstraction consumed by the browsing services.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{fmt, sync::Arc, time::Duration};
use thiserror::Error;

/// Failure talking to the backing store.
///
/// The message carries whatever the store reported, unchanged. Callers do
/// not retry or translate; they surface the failure to their own callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation `{op}` failed: {message}")]
    Unavailable { op: &'static str, message: String },
}

impl StoreError {
    pub fn unavailable(op: &'static str, err: impl fmt::Display) -> Self {
        Self::Unavailable {
            op,
            message: err.to_string(),
        }
    }
}

/// Everything needed to reach one bucket on behalf of one caller.
///
/// The secret arrives in a separate request header from the other fields
/// and must stay out of logs, so `Debug` renders it redacted.
#[derive(Clone)]
pub struct StoreCredentials {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Metadata for one stored object as a listing reports it.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub etag: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a recursive (ungrouped) listing.
#[derive(Clone, Debug, Default)]
pub struct FlatListing {
    pub objects: Vec<ObjectSummary>,
    pub next_token: Option<String>,
}

/// One page of a delimiter-grouped listing.
#[derive(Clone, Debug, Default)]
pub struct HierarchicalListing {
    pub objects: Vec<ObjectSummary>,
    pub common_prefixes: Vec<String>,
    pub next_token: Option<String>,
}

/// What the store acknowledged about a completed write.
#[derive(Clone, Debug, Default)]
pub struct PutOutcome {
    pub etag: Option<String>,
    pub size: Option<u64>,
}

/// A store client scoped to one bucket with one caller's credentials.
///
/// Keys are flat strings ordered lexicographically. Pagination tokens are
/// opaque and only meaningful for the argument combination that produced
/// them.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every key under `prefix` in key order, up to `max_keys` per page.
    async fn list_flat(
        &self,
        prefix: &str,
        max_keys: usize,
        token: Option<&str>,
    ) -> Result<FlatListing, StoreError>;

    /// List keys under `prefix`, grouping anything past the next occurrence
    /// of `delimiter` into common prefixes. `delimiter` must be non-empty.
    async fn list_hierarchical(
        &self,
        prefix: &str,
        delimiter: &str,
        max_keys: usize,
        token: Option<&str>,
    ) -> Result<HierarchicalListing, StoreError>;

    /// Write `bytes` at `key`, overwriting any previous object.
    async fn put_object(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<PutOutcome, StoreError>;

    /// Produce a URL that reads `key` without further authentication,
    /// valid for `ttl` from the moment of signing.
    async fn sign_get_url(&self, key: &str, ttl: Duration) -> Result<String, StoreError>;
}

/// Builds a store client from per-request credentials.
///
/// Implementations must not cache anything derived from the credentials;
/// every call gets a fresh, caller-scoped client.
pub trait StoreConnector: Send + Sync {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn ObjectStore>, StoreError>;
}
