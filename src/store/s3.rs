//! S3 adapter: a fresh client per request, built from caller credentials.

use super::traits::{
    FlatListing, HierarchicalListing, ObjectStore, ObjectSummary, PutOutcome, StoreConnector,
    StoreCredentials, StoreError,
};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, retry::RetryConfig},
    presigning::PresigningConfig,
    primitives::ByteStream,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};

/// Connector for real S3-compatible endpoints.
///
/// Holds deployment-level knobs only: an optional endpoint override for
/// S3-compatible stores and the bucket addressing style. Credentials arrive
/// with each request and never outlive the client built for it.
#[derive(Clone, Debug, Default)]
pub struct S3Connector {
    endpoint_url: Option<String>,
    force_path_style: bool,
}

impl S3Connector {
    pub fn new(endpoint_url: Option<String>, force_path_style: bool) -> Self {
        Self {
            endpoint_url,
            force_path_style,
        }
    }
}

impl StoreConnector for S3Connector {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn ObjectStore>, StoreError> {
        let provider = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "request-credentials",
        );

        // Callers own retry and timeout policy, so SDK retries stay off and
        // failures surface on the first attempt.
        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(provider)
            .retry_config(RetryConfig::disabled());
        if let Some(endpoint) = &self.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        if self.force_path_style {
            builder = builder.force_path_style(true);
        }

        Ok(Arc::new(S3Store {
            client: Client::from_conf(builder.build()),
            bucket: credentials.bucket.clone(),
        }))
    }
}

/// One bucket seen through one caller's credentials.
pub struct S3Store {
    client: Client,
    bucket: String,
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_flat(
        &self,
        prefix: &str,
        max_keys: usize,
        token: Option<&str>,
    ) -> Result<FlatListing, StoreError> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(max_keys as i32);
        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }
        if let Some(token) = token {
            request = request.continuation_token(token);
        }

        let output = request
            .send()
            .await
            .map_err(|e| StoreError::unavailable("list_objects_v2", e))?;

        Ok(FlatListing {
            objects: output.contents().iter().map(summarize).collect(),
            next_token: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn list_hierarchical(
        &self,
        prefix: &str,
        delimiter: &str,
        max_keys: usize,
        token: Option<&str>,
    ) -> Result<HierarchicalListing, StoreError> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .delimiter(delimiter)
            .max_keys(max_keys as i32);
        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }
        if let Some(token) = token {
            request = request.continuation_token(token);
        }

        let output = request
            .send()
            .await
            .map_err(|e| StoreError::unavailable("list_objects_v2", e))?;

        Ok(HierarchicalListing {
            objects: output.contents().iter().map(summarize).collect(),
            common_prefixes: output
                .common_prefixes()
                .iter()
                .filter_map(|p| p.prefix().map(str::to_string))
                .collect(),
            next_token: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn put_object(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<PutOutcome, StoreError> {
        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StoreError::unavailable("put_object", e))?;

        Ok(PutOutcome {
            etag: output.e_tag().map(str::to_string),
            // The put acknowledgment carries no size; listings are the
            // authority and the caller reads the key back for it.
            size: None,
        })
    }

    async fn sign_get_url(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        let signing = PresigningConfig::expires_in(ttl)
            .map_err(|e| StoreError::unavailable("presign_get_object", e))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(signing)
            .await
            .map_err(|e| StoreError::unavailable("presign_get_object", e))?;

        Ok(request.uri().to_string())
    }
}

fn summarize(object: &aws_sdk_s3::types::Object) -> ObjectSummary {
    ObjectSummary {
        key: object.key().unwrap_or_default().to_string(),
        size: object.size().unwrap_or(0).max(0) as u64,
        etag: object.e_tag().unwrap_or_default().to_string(),
        last_modified: object.last_modified().and_then(to_chrono),
    }
}

fn to_chrono(when: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(when.secs(), when.subsec_nanos())
}
