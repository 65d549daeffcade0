//! Result of a completed upload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata describing the object an upload produced.
///
/// `size` and `last_modified` come from reading the key back out of the
/// store after the write. When that confirmation cannot be completed the
/// values fall back to the uploaded payload length and the service clock;
/// the response shape is identical either way.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub key: String,
    pub etag: String,
    pub size: u64,
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
}
