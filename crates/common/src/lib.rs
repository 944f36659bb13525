//! Common utilities shared across the Casting API crates.

#![warn(clippy::pedantic)]

/// Module for JWT utilities (size limits, kid extraction, algorithm families)
pub mod jwt;
