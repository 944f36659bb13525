//! Bearer token authentication and permission checks.
//!
//! Tokens are issued by an external identity provider and verified against
//! the provider's published JWKS.

pub mod claims;
pub mod jwks;
pub mod jwt;
pub mod permissions;

pub use claims::{Audience, Claims};
pub use jwks::{Jwk, JwksClient};
pub use jwt::JwtValidator;
pub use permissions::check_permission;
