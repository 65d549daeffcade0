//! Recursive aggregation of everything beneath a path.

use super::{AGGREGATE_BATCH_SIZE, BrowseResult, BrowseService, paths};
use crate::models::aggregate::DirectoryAggregate;
use tracing::debug;

impl BrowseService {
    /// Walk every key under `path` and total up the files.
    ///
    /// The walk pages through the store until the cursor runs out, keeping
    /// only three scalar accumulators in memory, so cost grows with the
    /// number of keys but memory does not. Totals are exact as of the
    /// moment each page was read; there is no caching, estimation, or early
    /// exit, and a failure on any page fails the whole aggregate rather
    /// than reporting partial numbers.
    pub async fn directory_info(&self, path: &str) -> BrowseResult<DirectoryAggregate> {
        let path = paths::normalize_dir_path(path)?;

        let mut file_count = 0u64;
        let mut total_size = 0u64;
        let mut last_modified = None;
        let mut cursor: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let page = self
                .store
                .list_flat(&path, AGGREGATE_BATCH_SIZE, cursor.as_deref())
                .await?;
            pages += 1;

            for object in page.objects {
                if paths::is_directory_marker(&object.key) {
                    continue;
                }
                file_count += 1;
                total_size += object.size;
                if let Some(modified) = object.last_modified {
                    last_modified = Some(match last_modified {
                        Some(newest) if newest > modified => newest,
                        _ => modified,
                    });
                }
            }

            match page.next_token {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(path = %path, pages, file_count, total_size, "directory aggregate complete");

        Ok(DirectoryAggregate {
            path,
            file_count,
            total_size,
            last_modified,
            is_empty: file_count == 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::BrowseError;
    use crate::store::{
        FlatListing, HierarchicalListing, MemoryConnector, ObjectStore, ObjectSummary, PutOutcome,
        StoreConnector, StoreCredentials, StoreError,
    };
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

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

    /// Serves one listing page, then fails every continuation call.
    struct FailingWalkStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for FailingWalkStore {
        async fn list_flat(
            &self,
            prefix: &str,
            _max_keys: usize,
            _token: Option<&str>,
        ) -> Result<FlatListing, StoreError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(StoreError::unavailable("list_flat", "connection reset"));
            }
            Ok(FlatListing {
                objects: vec![ObjectSummary {
                    key: format!("{prefix}part-0.bin"),
                    size: 10,
                    etag: "\"p0\"".into(),
                    last_modified: None,
                }],
                next_token: Some("after-part-0".into()),
            })
        }

        async fn list_hierarchical(
            &self,
            _prefix: &str,
            _delimiter: &str,
            _max_keys: usize,
            _token: Option<&str>,
        ) -> Result<HierarchicalListing, StoreError> {
            Err(StoreError::unavailable(
                "list_hierarchical",
                "grouped listing disabled",
            ))
        }

        async fn put_object(
            &self,
            _key: &str,
            _bytes: Bytes,
            _content_type: &str,
        ) -> Result<PutOutcome, StoreError> {
            Err(StoreError::unavailable("put_object", "writes disabled"))
        }

        async fn sign_get_url(&self, _key: &str, _ttl: Duration) -> Result<String, StoreError> {
            Err(StoreError::unavailable("sign_get_url", "signing disabled"))
        }
    }

    #[tokio::test]
    async fn test_should_total_files_recursively() {
        let connector = MemoryConnector::new();
        for (key, size) in [
            ("reports/2024/a.pdf", 100),
            ("reports/2024/b.pdf", 200),
            ("reports/2024/archive/c.pdf", 50),
        ] {
            connector
                .seed_object(BUCKET, key, vec![0u8; size], Utc::now())
                .await;
        }
        let service = service_for(&connector);

        let aggregate = service.directory_info("reports/2024").await.unwrap();

        assert_eq!(aggregate.path, "reports/2024/");
        assert_eq!(aggregate.file_count, 3);
        assert_eq!(aggregate.total_size, 350);
        assert!(!aggregate.is_empty);
        assert!(aggregate.last_modified.is_some());
    }

    #[tokio::test]
    async fn test_should_report_marker_only_directories_as_empty() {
        let connector = MemoryConnector::new();
        connector
            .seed_object(BUCKET, "staging/", Bytes::new(), Utc::now())
            .await;
        let service = service_for(&connector);

        let aggregate = service.directory_info("staging").await.unwrap();

        assert_eq!(aggregate.file_count, 0);
        assert_eq!(aggregate.total_size, 0);
        assert!(aggregate.is_empty);
        assert!(aggregate.last_modified.is_none());
    }

    #[tokio::test]
    async fn test_should_track_latest_modification_time() {
        let connector = MemoryConnector::new();
        let older = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        let newest = Utc.with_ymd_and_hms(2024, 6, 2, 15, 30, 0).unwrap();
        connector
            .seed_object(BUCKET, "logs/jan.txt", Bytes::from_static(b"x"), older)
            .await;
        connector
            .seed_object(BUCKET, "logs/jun.txt", Bytes::from_static(b"x"), newest)
            .await;
        let service = service_for(&connector);

        let aggregate = service.directory_info("logs").await.unwrap();

        assert_eq!(aggregate.last_modified, Some(newest));
    }

    #[tokio::test]
    async fn test_should_walk_all_pages_of_large_directories() {
        let connector = MemoryConnector::with_page_cap(2);
        for index in 0..7 {
            let key = format!("big/file-{index}.bin");
            connector
                .seed_object(BUCKET, &key, vec![0u8; 10], Utc::now())
                .await;
        }
        let service = service_for(&connector);

        let aggregate = service.directory_info("big").await.unwrap();

        assert_eq!(aggregate.file_count, 7);
        assert_eq!(aggregate.total_size, 70);
    }

    #[tokio::test]
    async fn test_should_aggregate_whole_bucket_at_root() {
        let connector = MemoryConnector::new();
        connector
            .seed_object(BUCKET, "a.txt", vec![0u8; 5], Utc::now())
            .await;
        connector
            .seed_object(BUCKET, "deep/b.txt", vec![0u8; 7], Utc::now())
            .await;
        let service = service_for(&connector);

        let aggregate = service.directory_info("").await.unwrap();

        assert_eq!(aggregate.path, "");
        assert_eq!(aggregate.file_count, 2);
        assert_eq!(aggregate.total_size, 12);
    }

    #[tokio::test]
    async fn test_should_fail_whole_aggregate_when_any_page_fails() {
        let service = BrowseService::new(
            Arc::new(FailingWalkStore {
                calls: AtomicUsize::new(0),
            }),
            Duration::from_secs(300),
        );

        let err = service.directory_info("big").await.unwrap_err();

        assert!(matches!(err, BrowseError::StoreUnavailable(_)));
    }
}
