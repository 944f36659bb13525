//! Middleware for the casting service.
//!
//! # Components
//!
//! - `auth` - Permission-gated authentication for protected routes
//! - `http_metrics` - HTTP request metrics middleware

pub mod auth;
pub mod http_metrics;

pub use auth::{extract_bearer_token, require_permission, PermissionGate};
pub use http_metrics::http_metrics_middleware;
