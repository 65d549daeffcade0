//! Shared application state handed to every handler.

use crate::errors::AppError;
use crate::services::{BrowseError, BrowseService};
use crate::store::{StoreConnector, StoreCredentials};
use std::{sync::Arc, time::Duration};

/// What survives across requests: the connector and fixed policy knobs.
///
/// Nothing credential-derived lives here. Handlers call [`AppState::browse`]
/// with the credentials extracted from the request and get a service scoped
/// to that caller for the duration of the call.
#[derive(Clone)]
pub struct AppState {
    connector: Arc<dyn StoreConnector>,
    grant_ttl: Duration,
}

impl AppState {
    pub fn new(connector: Arc<dyn StoreConnector>, grant_ttl: Duration) -> Self {
        Self {
            connector,
            grant_ttl,
        }
    }

    /// Build a caller-scoped browsing service for one request.
    pub fn browse(&self, credentials: &StoreCredentials) -> Result<BrowseService, AppError> {
        let store = self
            .connector
            .connect(credentials)
            .map_err(BrowseError::from)?;
        Ok(BrowseService::new(store, self.grant_ttl))
    }
}
