//! Repository layer for the casting service.
//!
//! Handlers call repositories directly; there is no business logic between
//! them beyond request validation.

pub mod actors;
pub mod movies;

pub use actors::ActorsRepository;
pub use movies::MoviesRepository;
