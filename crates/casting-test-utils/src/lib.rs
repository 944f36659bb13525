//! # Casting Test Utilities
//!
//! Shared test utilities for the casting service.
//!
//! This crate provides:
//! - Deterministic signing keys and JWKS documents (`crypto_fixtures`)
//! - Claims builders (`token_builders`)
//! - Server test harness (`TestCastingServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use casting_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_example(pool: PgPool) -> Result<()> {
//!     let server = TestCastingServer::spawn(pool).await?;
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/api/movies", server.url()))
//!         .bearer_auth(server.token(&["get:movies"]))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod crypto_fixtures;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
