//! Rows surfaced by a hierarchical listing: files and virtual directories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single stored object presented as a file row.
///
/// Flat object listings do not carry a MIME type, so `content_type` is
/// usually empty in listing responses and only populated after an upload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Full key of the object within its bucket.
    pub key: String,

    /// Final path component, shown to users instead of the raw key.
    pub display_name: String,

    /// Payload size in bytes.
    pub size: u64,

    /// Store-assigned entity tag, quoted exactly as the store returns it.
    pub etag: String,

    /// Last modification time, when the store reported one.
    pub last_modified: Option<DateTime<Utc>>,

    /// MIME type, when known.
    pub content_type: String,
}

/// A directory derived from grouping keys at the delimiter.
///
/// Directories have no inherent existence in the store. One appears here
/// because at least one key (or marker object) lies beneath its prefix.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    /// Directory name without any delimiter.
    pub name: String,

    /// Canonical path of the directory, always ending in `/`.
    pub full_path: String,
}

/// One row of a directory listing, tagged `file` or `directory` on the wire.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    File(FileEntry),
    Directory(DirectoryEntry),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_tag_entries_by_kind() {
        let entry = Entry::Directory(DirectoryEntry {
            name: "archive".into(),
            full_path: "reports/archive/".into(),
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "directory");
        assert_eq!(value["fullPath"], "reports/archive/");
    }

    #[test]
    fn test_should_serialize_file_fields_as_camel_case() {
        let entry = Entry::File(FileEntry {
            key: "reports/a.pdf".into(),
            display_name: "a.pdf".into(),
            size: 100,
            etag: "\"abc\"".into(),
            last_modified: None,
            content_type: String::new(),
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!(value["displayName"], "a.pdf");
        assert_eq!(value["size"], 100);
        assert!(value["lastModified"].is_null());
    }
}
