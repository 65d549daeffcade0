//! Time-limited access to a single object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pre-authorized download URL and the instant it stops working.
///
/// The URL embeds its own authorization, so holding it is holding access:
/// consumers must not log it or keep it past `expires_at`. `expires_at` is
/// computed before signing, so the URL never dies earlier than advertised.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
