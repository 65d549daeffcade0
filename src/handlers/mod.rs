//! HTTP handler modules.

pub mod browse_handlers;
pub mod health_handlers;
