//! Casting Service Library
//!
//! A CRUD HTTP API for actors and movies, gated by role-based permissions
//! carried in JWTs issued by an external identity provider.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/auth.rs (token gate) -> handlers/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - JWKS client, JWT validation, claims, permission checks
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Permission gate and HTTP metrics middleware
//! - `models` - Records, request bodies, response envelopes
//! - `observability` - Prometheus metrics
//! - `repositories` - Database access
//! - `routes` - Axum router setup

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;

pub use observability::metrics::init_metrics_recorder;
