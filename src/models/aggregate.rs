//! Recursive roll-up of everything stored beneath a directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Totals computed by walking every key under a path.
///
/// Marker objects are excluded from every figure, so a directory holding
/// only markers reports as empty.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryAggregate {
    /// Canonical path the aggregate describes.
    pub path: String,

    /// Number of files beneath the path, at any depth.
    pub file_count: u64,

    /// Sum of file sizes in bytes.
    pub total_size: u64,

    /// Most recent modification time among those files.
    pub last_modified: Option<DateTime<Utc>>,

    /// True when no files exist beneath the path.
    pub is_empty: bool,
}
