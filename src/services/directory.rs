//! Directory materialization.

use super::{BrowseError, BrowseResult, BrowseService, DIRECTORY_MARKER_CONTENT_TYPE, paths};
use bytes::Bytes;
use tracing::debug;

impl BrowseService {
    /// Make `path` visible as a directory even while it holds no files.
    ///
    /// The store itself has no directories, so visibility is faked with a
    /// zero-byte marker object whose key is the directory prefix. Hierarchical
    /// listings then surface the prefix whether or not real files exist under
    /// it. Writing the marker again is harmless; the call does not check for
    /// an existing one first.
    pub async fn create_directory(&self, path: &str) -> BrowseResult<String> {
        let path = paths::normalize_dir_path(path)?;
        if path.is_empty() {
            return Err(BrowseError::InvalidPath {
                path: path.clone(),
                reason: "the root directory always exists",
            });
        }

        self.store
            .put_object(&path, Bytes::new(), DIRECTORY_MARKER_CONTENT_TYPE)
            .await?;

        debug!(path = %path, "directory marker written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryConnector, StoreConnector, StoreCredentials};
    use std::time::Duration;

    const BUCKET: &str = "tenant-files";

    fn credentials() -> StoreCredentials {
        StoreCredentials {
            bucket: BUCKET.into(),
            region: "us-east-1".into(),
            access_key_id: "AKIATEST".into(),
            secret_access_key: "shhh".into(),
        }
    }

    fn service_for(connector: &MemoryConnector) -> BrowseService {
        BrowseService::new(
            connector.connect(&credentials()).unwrap(),
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn test_should_create_marker_object_with_directory_content_type() {
        let connector = MemoryConnector::new();
        let service = service_for(&connector);

        let created = service.create_directory("projects/fresh").await.unwrap();

        assert_eq!(created, "projects/fresh/");
        assert_eq!(
            connector.content_type_of(BUCKET, "projects/fresh/").await,
            Some(DIRECTORY_MARKER_CONTENT_TYPE.to_string())
        );
    }

    #[tokio::test]
    async fn test_should_surface_created_directory_in_parent_listing() {
        let connector = MemoryConnector::new();
        let service = service_for(&connector);

        service.create_directory("projects/fresh").await.unwrap();
        let page = service
            .list_directory("projects", "", None, None)
            .await
            .unwrap();

        assert_eq!(page.entries.len(), 1);
        match &page.entries[0] {
            crate::models::entry::Entry::Directory(dir) => {
                assert_eq!(dir.name, "fresh");
                assert_eq!(dir.full_path, "projects/fresh/");
            }
            other => panic!("expected a directory entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_should_accept_repeat_creation_of_same_directory() {
        let connector = MemoryConnector::new();
        let service = service_for(&connector);

        service.create_directory("projects/fresh").await.unwrap();
        let second = service.create_directory("projects/fresh/").await.unwrap();

        assert_eq!(second, "projects/fresh/");
    }

    #[tokio::test]
    async fn test_should_reject_root_as_directory_target() {
        let connector = MemoryConnector::new();
        let service = service_for(&connector);

        let err = service.create_directory("").await.unwrap_err();

        assert!(matches!(err, BrowseError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn test_should_reject_traversal_segments() {
        let connector = MemoryConnector::new();
        let service = service_for(&connector);

        let err = service.create_directory("projects/../other").await.unwrap_err();

        assert!(matches!(err, BrowseError::InvalidPath { .. }));
    }
}
