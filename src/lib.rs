//! Directory-tree browsing over flat S3-style object storage.
//!
//! The store itself has no directories: every object lives under a flat key
//! namespace, ordered lexicographically. This crate projects `/`-separated
//! key prefixes into the directory tree callers expect: paged listings with
//! name search, recursive size/count aggregation, directory creation via
//! zero-byte marker objects, short-lived download URLs, and uploads whose
//! reported metadata is read back from the store.
//!
//! Store credentials are not process configuration. They arrive with every
//! request (the secret in a separate `Authorization` header) and a fresh
//! bucket-scoped client is built per call, so one deployment serves many
//! tenants without cross-talk.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
