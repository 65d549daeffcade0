//! Hierarchical listing: one directory level at a time, with name search.

use super::{
    BrowseError, BrowseResult, BrowseService, DEFAULT_CONTENTS_PAGE_SIZE,
    DEFAULT_LISTING_PAGE_SIZE, DELIMITER, MAX_PAGE_SIZE, paths,
};
use crate::models::{
    entry::{DirectoryEntry, Entry, FileEntry},
    listing::{DirectoryContents, ListingPage},
};
use tracing::debug;

impl BrowseService {
    /// List the immediate children of `path`, optionally narrowed to names
    /// starting with `filter`.
    ///
    /// The filter extends the listing prefix, so narrowing happens inside
    /// the store rather than by post-filtering pages. Subdirectories come
    /// back as grouped prefixes; directory markers and keys nested deeper
    /// than one level never surface as files. An absent or empty `cursor`
    /// requests the first page; only a cursor from a previous page resumes.
    pub async fn list_directory(
        &self,
        path: &str,
        filter: &str,
        cursor: Option<&str>,
        page_size: Option<usize>,
    ) -> BrowseResult<ListingPage> {
        let path = paths::normalize_dir_path(path)?;
        // Clients send an empty cursor on first-page requests; the store
        // must never see it as a resume token.
        let cursor = cursor.filter(|c| !c.is_empty());
        if filter.contains(DELIMITER) {
            return Err(BrowseError::InvalidPath {
                path: filter.to_string(),
                reason: "search filter must not contain the delimiter",
            });
        }
        let page_size = page_size
            .unwrap_or(DEFAULT_LISTING_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let prefix = format!("{path}{filter}");

        let listing = self
            .store
            .list_hierarchical(&prefix, DELIMITER, page_size, cursor)
            .await?;

        let mut entries =
            Vec::with_capacity(listing.common_prefixes.len() + listing.objects.len());
        for grouped in &listing.common_prefixes {
            let name = paths::directory_name_from_prefix(grouped, &path)?;
            entries.push(Entry::Directory(DirectoryEntry {
                name: name.to_string(),
                full_path: paths::child_prefix(&path, name),
            }));
        }
        for object in listing.objects {
            if paths::is_directory_marker(&object.key) {
                continue;
            }
            if !paths::is_direct_child(&object.key, &path) {
                continue;
            }
            let display_name = paths::relative_name(&object.key, &path)?.to_string();
            entries.push(Entry::File(FileEntry {
                display_name,
                key: object.key,
                size: object.size,
                etag: object.etag,
                last_modified: object.last_modified,
                content_type: String::new(),
            }));
        }

        debug!(
            path = %path,
            entries = entries.len(),
            truncated = listing.next_token.is_some(),
            "hierarchical listing complete"
        );

        Ok(ListingPage {
            entries,
            cursor: listing.next_token,
            source_path: path,
        })
    }

    /// Every file beneath `path` at any depth, in key order, one page at a
    /// time. Nothing is grouped here; display names are final components.
    pub async fn directory_contents(
        &self,
        path: &str,
        cursor: Option<&str>,
        max_keys: Option<usize>,
    ) -> BrowseResult<DirectoryContents> {
        let path = paths::normalize_dir_path(path)?;
        let cursor = cursor.filter(|c| !c.is_empty());
        let max_keys = max_keys
            .unwrap_or(DEFAULT_CONTENTS_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let listing = self.store.list_flat(&path, max_keys, cursor).await?;
        let files: Vec<FileEntry> = listing
            .objects
            .into_iter()
            .filter(|object| !paths::is_directory_marker(&object.key))
            .map(|object| FileEntry {
                display_name: paths::final_component(&object.key).to_string(),
                key: object.key,
                size: object.size,
                etag: object.etag,
                last_modified: object.last_modified,
                content_type: String::new(),
            })
            .collect();

        debug!(
            path = %path,
            files = files.len(),
            truncated = listing.next_token.is_some(),
            "flat contents listing complete"
        );

        Ok(DirectoryContents {
            total_count: files.len() as u64,
            files,
            cursor: listing.next_token,
            directory_path: path,
        })
    }
}
