//! Directory-browsing services layered over the store abstraction.
//!
//! [`BrowseService`] owns a bucket-scoped store client for the duration of
//! one request and exposes the browsing operations on top of it. Path rules
//! live in [`paths`]; each operation sits in its own module.

pub mod aggregate;
pub mod directory;
pub mod grants;
pub mod listing;
pub mod paths;
pub mod upload;

use crate::store::{ObjectStore, StoreError};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

/// Delimiter that turns flat keys into a directory hierarchy.
pub const DELIMITER: &str = "/";

/// Content type marking zero-byte directory placeholder objects.
pub const DIRECTORY_MARKER_CONTENT_TYPE: &str = "application/x-directory";

/// Page size for hierarchical listings when the caller does not pick one.
pub const DEFAULT_LISTING_PAGE_SIZE: usize = 20;

/// Page size for flat directory contents when the caller does not pick one.
pub const DEFAULT_CONTENTS_PAGE_SIZE: usize = 100;

/// Upper bound any single listing call may request from the store.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Batch size the aggregator walks the key space with.
const AGGREGATE_BATCH_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

pub type BrowseResult<T> = Result<T, BrowseError>;

/// Browsing operations bound to one caller's bucket.
///
/// Construction is cheap: a fresh instance is built for every request from
/// that request's credentials and dropped when the response goes out.
#[derive(Clone)]
pub struct BrowseService {
    store: Arc<dyn ObjectStore>,
    grant_ttl: Duration,
}

impl BrowseService {
    pub fn new(store: Arc<dyn ObjectStore>, grant_ttl: Duration) -> Self {
        Self { store, grant_ttl }
    }
}
