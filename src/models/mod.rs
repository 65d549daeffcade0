//! Wire-level data models for the directory-browsing API.
//!
//! These are the JSON shapes handlers return to clients. Field names are
//! camelCase on the wire, sizes are byte counts, and timestamps serialize
//! as RFC 3339 via `chrono`.

pub mod aggregate;
pub mod entry;
pub mod grant;
pub mod listing;
pub mod upload;
