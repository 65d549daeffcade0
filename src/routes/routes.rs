//! Defines routes for all browsing and upload operations.
//!
//! ## Structure
//! - **Read endpoints**
//!   - `GET  /healthz`            -> liveness probe
//!   - `GET  /listing`            -> one directory level (files + subdirectories)
//!   - `GET  /directory-info`     -> recursive aggregate for a path
//!   - `GET  /directory-contents` -> every file under a path, flat
//!   - `GET  /secure-url`         -> presigned download link for one key
//!
//! - **Write endpoints**
//!   - `POST /create-directory`   -> materialize an empty directory
//!   - `POST /upload`             -> multipart file upload
//!
//! Every endpoint except `/healthz` expects caller credentials: `bucket`,
//! `region`, and `accessKeyId` among the request parameters, the secret key
//! in the `Authorization` header.

use crate::{
    handlers::{
        browse_handlers::{
            create_directory, get_directory_contents, get_directory_info, get_listing,
            get_secure_url, upload_file,
        },
        health_handlers::healthz,
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Build and return the router for all browsing routes.
///
/// The router carries shared state (`AppState`) to all handlers. Only the
/// upload route gets the raised body limit; everything else keeps the axum
/// default.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // health endpoint (mounted at root)
        .route("/healthz", get(healthz))
        // read endpoints
        .route("/listing", get(get_listing))
        .route("/directory-info", get(get_directory_info))
        .route("/directory-contents", get(get_directory_contents))
        .route("/secure-url", get(get_secure_url))
        // write endpoints
        .route("/create-directory", post(create_directory))
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}
