//! Time-limited download grants.

use super::{BrowseResult, BrowseService, paths};
use crate::models::grant::AccessGrant;
use chrono::Utc;
use tracing::debug;

impl BrowseService {
    /// Issue a presigned download URL for `key`.
    ///
    /// The grant is computed from the caller's credentials alone; the store
    /// is not asked whether the object exists, so a grant for a missing key
    /// succeeds here and fails only when the URL is used. `expires_at` is
    /// taken before signing, which makes it a lower bound on the real
    /// signature window.
    pub async fn issue_grant(&self, key: &str) -> BrowseResult<AccessGrant> {
        let key = paths::validate_object_key(key)?;

        let expires_at = Utc::now() + chrono::Duration::seconds(self.grant_ttl.as_secs() as i64);
        let url = self.store.sign_get_url(key, self.grant_ttl).await?;

        debug!(key = %key, expires_at = %expires_at, "download grant issued");
        Ok(AccessGrant { url, expires_at })
    }
}
