//! Observability module for the casting service.
//!
//! Provides metrics definitions and instrumentation helpers.

pub mod metrics;
