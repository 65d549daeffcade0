//! In-memory store used by the test suite and the `memory` backend.
//!
//! Keys live in a `BTreeMap` per bucket, which provides the lexicographic
//! ordering real stores guarantee. Listing follows S3 ListObjectsV2 rules:
//! delimiter grouping, keys and grouped prefixes counted together against
//! `max_keys`, and opaque base64 continuation tokens. Writes auto-create
//! the bucket; reads against a bucket that was never written fail the way a
//! missing bucket fails upstream.

use super::traits::{
    FlatListing, HierarchicalListing, ObjectStore, ObjectSummary, PutOutcome, StoreConnector,
    StoreCredentials, StoreError,
};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
    time::Duration,
};
use tokio::sync::RwLock;

const DEFAULT_PAGE_CAP: usize = 1000;

#[derive(Clone, Debug)]
struct StoredObject {
    bytes: Bytes,
    content_type: String,
    etag: String,
    last_modified: DateTime<Utc>,
}

#[derive(Default)]
struct SharedState {
    buckets: HashMap<String, BTreeMap<String, StoredObject>>,
}

/// Connector whose buckets live in process memory.
///
/// Clones share the same object map, so a connector can be handed to a
/// router while a test keeps its own handle for seeding and inspection.
#[derive(Clone)]
pub struct MemoryConnector {
    state: Arc<RwLock<SharedState>>,
    page_cap: usize,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::with_page_cap(DEFAULT_PAGE_CAP)
    }

    /// Lower the per-page ceiling below the usual 1000. Lets tests force
    /// pagination with a handful of keys.
    pub fn with_page_cap(page_cap: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(SharedState::default())),
            page_cap: page_cap.max(1),
        }
    }

    /// Insert an object directly, bypassing the service layer.
    pub async fn seed_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: impl Into<Bytes>,
        last_modified: DateTime<Utc>,
    ) {
        let bytes = bytes.into();
        let etag = quoted_md5(&bytes);
        let mut state = self.state.write().await;
        state.buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: String::new(),
                etag,
                last_modified,
            },
        );
    }

    /// Look up the content type recorded for a key, for test assertions.
    pub async fn content_type_of(&self, bucket: &str, key: &str) -> Option<String> {
        let state = self.state.read().await;
        state
            .buckets
            .get(bucket)?
            .get(key)
            .map(|object| object.content_type.clone())
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreConnector for MemoryConnector {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn ObjectStore>, StoreError> {
        Ok(Arc::new(MemoryStore {
            state: self.state.clone(),
            bucket: credentials.bucket.clone(),
            region: credentials.region.clone(),
            access_key_id: credentials.access_key_id.clone(),
            page_cap: self.page_cap,
        }))
    }
}

/// Bucket-scoped view over the shared map.
pub struct MemoryStore {
    state: Arc<RwLock<SharedState>>,
    bucket: String,
    region: String,
    access_key_id: String,
    page_cap: usize,
}

/// Where a continuation token resumes. Resuming after a grouped prefix
/// skips the whole group, so directories never repeat across pages.
enum Resume {
    AfterKey(String),
    AfterPrefix(String),
}

impl MemoryStore {
    async fn list(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        max_keys: usize,
        token: Option<&str>,
    ) -> Result<(Vec<ObjectSummary>, Vec<String>, Option<String>), StoreError> {
        let max_keys = max_keys.clamp(1, self.page_cap);
        // S3 rejects an empty ContinuationToken outright.
        if token.is_some_and(str::is_empty) {
            return Err(StoreError::unavailable(
                "list_objects_v2",
                "the provided continuation token is invalid",
            ));
        }
        let resume = token.map(decode_token);

        let state = self.state.read().await;
        let bucket = state.buckets.get(&self.bucket).ok_or_else(|| {
            StoreError::unavailable(
                "list_objects_v2",
                format!("bucket `{}` does not exist", self.bucket),
            )
        })?;

        let mut objects = Vec::new();
        let mut seen_prefixes = BTreeSet::new();
        let mut emitted = 0usize;
        let mut last: Option<Resume> = None;
        let mut next_token = None;

        for (key, object) in bucket.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            match &resume {
                Some(Resume::AfterKey(after)) if key.as_str() <= after.as_str() => continue,
                Some(Resume::AfterPrefix(after))
                    if key.as_str() <= after.as_str() || key.starts_with(after.as_str()) =>
                {
                    continue;
                }
                _ => {}
            }

            if let Some(delimiter) = delimiter {
                if let Some(grouped) = group_at_delimiter(key, prefix, delimiter) {
                    if seen_prefixes.contains(&grouped) {
                        continue;
                    }
                    if emitted == max_keys {
                        next_token = last.as_ref().map(encode_token);
                        break;
                    }
                    emitted += 1;
                    last = Some(Resume::AfterPrefix(grouped.clone()));
                    seen_prefixes.insert(grouped);
                    continue;
                }
            }

            if emitted == max_keys {
                next_token = last.as_ref().map(encode_token);
                break;
            }
            emitted += 1;
            objects.push(summarize(key, object));
            last = Some(Resume::AfterKey(key.clone()));
        }

        Ok((objects, seen_prefixes.into_iter().collect(), next_token))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_flat(
        &self,
        prefix: &str,
        max_keys: usize,
        token: Option<&str>,
    ) -> Result<FlatListing, StoreError> {
        let (objects, _, next_token) = self.list(prefix, None, max_keys, token).await?;
        Ok(FlatListing {
            objects,
            next_token,
        })
    }

    async fn list_hierarchical(
        &self,
        prefix: &str,
        delimiter: &str,
        max_keys: usize,
        token: Option<&str>,
    ) -> Result<HierarchicalListing, StoreError> {
        let (objects, common_prefixes, next_token) =
            self.list(prefix, Some(delimiter), max_keys, token).await?;
        Ok(HierarchicalListing {
            objects,
            common_prefixes,
            next_token,
        })
    }

    async fn put_object(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<PutOutcome, StoreError> {
        let etag = quoted_md5(&bytes);
        let size = bytes.len() as u64;

        let mut state = self.state.write().await;
        state
            .buckets
            .entry(self.bucket.clone())
            .or_default()
            .insert(
                key.to_string(),
                StoredObject {
                    bytes,
                    content_type: content_type.to_string(),
                    etag: etag.clone(),
                    last_modified: Utc::now(),
                },
            );

        Ok(PutOutcome {
            etag: Some(etag),
            size: Some(size),
        })
    }

    async fn sign_get_url(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        let state = self.state.read().await;
        if !state.buckets.contains_key(&self.bucket) {
            return Err(StoreError::unavailable(
                "presign_get_object",
                format!("bucket `{}` does not exist", self.bucket),
            ));
        }

        let issued_at = Utc::now();
        let signature = format!(
            "{:x}",
            md5::compute(format!(
                "{}/{}/{}",
                self.access_key_id,
                key,
                issued_at.timestamp()
            ))
        );
        Ok(format!(
            "https://{bucket}.s3.{region}.amazonaws.com/{key}\
             ?X-Amz-Algorithm=AWS4-HMAC-SHA256\
             &X-Amz-Credential={access_key_id}%2F{date}%2F{region}%2Fs3%2Faws4_request\
             &X-Amz-Date={stamp}\
             &X-Amz-Expires={expires}\
             &X-Amz-SignedHeaders=host\
             &X-Amz-Signature={signature}",
            bucket = self.bucket,
            region = self.region,
            key = key,
            access_key_id = self.access_key_id,
            date = issued_at.format("%Y%m%d"),
            stamp = issued_at.format("%Y%m%dT%H%M%SZ"),
            expires = ttl.as_secs(),
            signature = signature,
        ))
    }
}

/// Check whether a URL produced by [`MemoryStore::sign_get_url`] is still
/// valid at `now`, evaluating `X-Amz-Date` plus `X-Amz-Expires` the way the
/// store would.
pub fn url_is_live(url: &str, now: DateTime<Utc>) -> bool {
    let Some((_, query)) = url.split_once('?') else {
        return false;
    };

    let mut issued_at = None;
    let mut expires_in = None;
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("X-Amz-Date", value)) => {
                issued_at = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%SZ").ok();
            }
            Some(("X-Amz-Expires", value)) => {
                expires_in = value.parse::<i64>().ok();
            }
            _ => {}
        }
    }

    match (issued_at, expires_in) {
        (Some(issued_at), Some(expires_in)) => {
            now.naive_utc() <= issued_at + chrono::Duration::seconds(expires_in)
        }
        _ => false,
    }
}

fn quoted_md5(bytes: &Bytes) -> String {
    format!("\"{:x}\"", md5::compute(bytes))
}

fn summarize(key: &str, object: &StoredObject) -> ObjectSummary {
    ObjectSummary {
        key: key.to_string(),
        size: object.bytes.len() as u64,
        etag: object.etag.clone(),
        last_modified: Some(object.last_modified),
    }
}

/// Compute the grouped prefix for a key under S3 delimiter semantics, as in
/// ListObjectsV2: everything up to and including the first delimiter after
/// the requested prefix. Returns `None` when the key has no delimiter past
/// the prefix and therefore lists as an object.
fn group_at_delimiter(key: &str, prefix: &str, delimiter: &str) -> Option<String> {
    let remainder = key.strip_prefix(prefix)?;
    let position = remainder.find(delimiter)?;
    Some(format!(
        "{}{}",
        prefix,
        &remainder[..position + delimiter.len()]
    ))
}

fn encode_token(resume: &Resume) -> String {
    let raw = match resume {
        Resume::AfterKey(key) => format!("k:{key}"),
        Resume::AfterPrefix(prefix) => format!("p:{prefix}"),
    };
    general_purpose::STANDARD.encode(raw)
}

fn decode_token(token: &str) -> Resume {
    let raw = general_purpose::STANDARD
        .decode(token)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| token.to_string());
    match raw.split_once(':') {
        Some(("p", prefix)) => Resume::AfterPrefix(prefix.to_string()),
        Some(("k", key)) => Resume::AfterKey(key.to_string()),
        _ => Resume::AfterKey(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUCKET: &str = "tenant-files";

    fn credentials() -> StoreCredentials {
        StoreCredentials {
            bucket: BUCKET.into(),
            region: "us-east-1".into(),
            access_key_id: "AKIATEST".into(),
            secret_access_key: "shhh".into(),
        }
    }

    async fn store_with(keys: &[&str]) -> (MemoryConnector, Arc<dyn ObjectStore>) {
        let connector = MemoryConnector::new();
        for key in keys {
            connector
                .seed_object(BUCKET, key, Bytes::from_static(b"x"), Utc::now())
                .await;
        }
        let store = connector.connect(&credentials()).unwrap();
        (connector, store)
    }

    #[tokio::test]
    async fn test_should_group_keys_at_delimiter() {
        let (_, store) = store_with(&[
            "reports/2024/a.pdf",
            "reports/2024/b.pdf",
            "reports/2024/archive/c.pdf",
        ])
        .await;

        let listing = store
            .list_hierarchical("reports/2024/", "/", 1000, None)
            .await
            .unwrap();

        assert_eq!(listing.common_prefixes, vec!["reports/2024/archive/"]);
        let keys: Vec<&str> = listing.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["reports/2024/a.pdf", "reports/2024/b.pdf"]);
        assert!(listing.next_token.is_none());
    }

    #[tokio::test]
    async fn test_should_exclude_keys_outside_prefix() {
        let (_, store) = store_with(&["reports/2024/a.pdf", "reports/2025/z.pdf", "other/x.txt"])
            .await;

        let listing = store.list_flat("reports/2024/", 1000, None).await.unwrap();

        assert_eq!(listing.objects.len(), 1);
        assert_eq!(listing.objects[0].key, "reports/2024/a.pdf");
    }

    #[tokio::test]
    async fn test_should_not_repeat_entries_across_pages() {
        let connector = MemoryConnector::with_page_cap(2);
        for key in [
            "docs/a.txt",
            "docs/b/deep1.txt",
            "docs/b/deep2.txt",
            "docs/c.txt",
            "docs/d/deep.txt",
            "docs/e.txt",
        ] {
            connector
                .seed_object(BUCKET, key, Bytes::from_static(b"x"), Utc::now())
                .await;
        }
        let store = connector.connect(&credentials()).unwrap();

        let mut collected = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = store
                .list_hierarchical("docs/", "/", 2, token.as_deref())
                .await
                .unwrap();
            collected.extend(page.objects.into_iter().map(|o| o.key));
            collected.extend(page.common_prefixes);
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        collected.sort();
        assert_eq!(
            collected,
            vec![
                "docs/a.txt",
                "docs/b/",
                "docs/c.txt",
                "docs/d/",
                "docs/e.txt"
            ]
        );
    }

    #[tokio::test]
    async fn test_should_list_marker_key_at_its_own_prefix() {
        let (_, store) = store_with(&["projects/new/"]).await;

        let listing = store
            .list_hierarchical("projects/new/", "/", 1000, None)
            .await
            .unwrap();

        assert_eq!(listing.objects.len(), 1);
        assert_eq!(listing.objects[0].key, "projects/new/");
        assert!(listing.common_prefixes.is_empty());
    }

    #[tokio::test]
    async fn test_should_error_when_bucket_missing() {
        let connector = MemoryConnector::new();
        let store = connector.connect(&credentials()).unwrap();

        let err = store.list_flat("", 10, None).await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_should_reject_empty_continuation_token() {
        let (_, store) = store_with(&["reports/a.pdf"]).await;

        let err = store.list_flat("reports/", 10, Some("")).await.unwrap_err();
        assert!(err.to_string().contains("continuation token"));
    }

    #[tokio::test]
    async fn test_should_change_etag_on_overwrite() {
        let (_, store) = store_with(&[]).await;

        let first = store
            .put_object("a.txt", Bytes::from_static(b"one"), "text/plain")
            .await
            .unwrap();
        let second = store
            .put_object("a.txt", Bytes::from_static(b"two"), "text/plain")
            .await
            .unwrap();

        assert_ne!(first.etag, second.etag);
        assert_eq!(second.size, Some(3));
    }

    #[tokio::test]
    async fn test_should_sign_urls_that_expire() {
        let (_, store) = store_with(&["reports/a.pdf"]).await;

        let url = store
            .sign_get_url("reports/a.pdf", Duration::from_secs(300))
            .await
            .unwrap();

        assert!(url.contains("X-Amz-Expires=300"));
        assert!(url.contains("reports/a.pdf"));
        assert!(url_is_live(&url, Utc::now()));
        assert!(!url_is_live(&url, Utc::now() + chrono::Duration::seconds(301)));
    }

    #[tokio::test]
    async fn test_should_round_trip_resume_tokens() {
        let token = encode_token(&Resume::AfterPrefix("docs/b/".into()));
        match decode_token(&token) {
            Resume::AfterPrefix(prefix) => assert_eq!(prefix, "docs/b/"),
            Resume::AfterKey(_) => panic!("expected prefix resume"),
        }
    }
}
