//! Upload coordination: write, then reconcile metadata.

use super::{BrowseResult, BrowseService, paths};
use crate::models::upload::UploadResult;
use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, warn};

impl BrowseService {
    /// Write `bytes` at `key` and report what the store now holds.
    ///
    /// The write acknowledgement is thin, so a follow-up listing of the key
    /// refines the reported size, timestamp, and etag. If the read-back
    /// misses or fails the upload still succeeds with ack-derived metadata
    /// and the gap is logged as a warning, not returned as an error.
    pub async fn upload_file(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> BrowseResult<UploadResult> {
        let key = paths::validate_object_key(key)?;

        let payload_len = bytes.len() as u64;
        let outcome = self.store.put_object(key, bytes, content_type).await?;

        let mut result = UploadResult {
            key: key.to_string(),
            etag: outcome.etag.unwrap_or_default(),
            size: outcome.size.unwrap_or(payload_len),
            content_type: content_type.to_string(),
            last_modified: Utc::now(),
        };

        match self.store.list_flat(key, 1, None).await {
            Ok(listing) => match listing.objects.into_iter().find(|o| o.key == key) {
                Some(stored) => {
                    result.size = stored.size;
                    if let Some(modified) = stored.last_modified {
                        result.last_modified = modified;
                    }
                    if result.etag.is_empty() {
                        result.etag = stored.etag;
                    }
                }
                None => warn!(key = %key, "uploaded object missing from read-back listing"),
            },
            Err(err) => warn!(key = %key, error = %err, "read-back after upload failed"),
        }

        debug!(key = %key, size = result.size, "upload complete");
        Ok(result)
    }
}
