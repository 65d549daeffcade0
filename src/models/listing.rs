//! Response shapes for the paged listing endpoints.

use super::entry::{Entry, FileEntry};
use serde::{Deserialize, Serialize};

/// One page of a hierarchical directory listing.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    /// Directory rows first, then file rows, each group in store order.
    pub entries: Vec<Entry>,

    /// Opaque cursor for the next page. `None` on the final page.
    pub cursor: Option<String>,

    /// Canonical form of the path that was listed.
    pub source_path: String,
}

/// One page of every file beneath a directory, recursively, ungrouped.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryContents {
    pub files: Vec<FileEntry>,

    /// Number of files in this page. Marker objects are not counted.
    pub total_count: u64,

    /// Opaque cursor for the next page. `None` on the final page.
    pub cursor: Option<String>,

    /// Canonical form of the requested directory path.
    pub directory_path: String,
}
