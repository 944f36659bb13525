//! JWT utilities shared across the Casting API crates.
//!
//! This module provides the pieces of bearer-token handling that do not
//! depend on a particular key directory:
//! - Size limits for DoS prevention
//! - Clock skew bounds for `exp`/`nbf` leeway configuration
//! - Key ID extraction from the unverified JWT header
//! - Algorithm family classification for matching keys to algorithms
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - `extract_kid` never validates a signature; the token MUST still be
//!   verified against a key from a trusted JWKS
//! - HMAC algorithms are never accepted for third-party issued tokens
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{extract_kid, MAX_JWT_SIZE_BYTES};
//!
//! // Extract key ID for JWKS lookup (includes the size check)
//! let kid = extract_kid(token)?;
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::Algorithm;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// JWTs larger than this are rejected BEFORE any base64 decoding or
/// cryptographic work. Identity-provider access tokens with a handful of
/// permissions are typically well under 2KB.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Default leeway applied to `exp` and `nbf` checks.
///
/// Zero: a token is expired the second its `exp` passes.
pub const DEFAULT_LEEWAY: Duration = Duration::from_secs(0);

/// Maximum allowed leeway (10 minutes).
///
/// Bounds configuration so a typo cannot silently accept long-expired tokens.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while inspecting an unverified JWT.
///
/// Messages are intentionally generic. Detail is logged at debug level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure).
    #[error("The access token is invalid")]
    MalformedToken,

    /// Token is missing required `kid` header.
    #[error("The access token is invalid")]
    MissingKid,
}

// =============================================================================
// Algorithm Families
// =============================================================================

/// Key family a JWS algorithm belongs to.
///
/// A decoding key can only verify algorithms of its own family, so the
/// configured algorithm list is narrowed to the matched key's family before
/// verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    /// Shared-secret HMAC (`HS*`). Never valid for JWKS-published keys.
    Hmac,
    /// RSA PKCS#1 v1.5 and PSS (`RS*`, `PS*`), JWK `kty` "RSA".
    Rsa,
    /// ECDSA (`ES*`), JWK `kty` "EC".
    Ec,
    /// Edwards curve (`EdDSA`), JWK `kty` "OKP".
    Okp,
}

impl AlgorithmFamily {
    /// Classify a JWS algorithm.
    #[must_use]
    pub fn of(alg: Algorithm) -> Self {
        match alg {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Self::Hmac,
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Self::Rsa,
            Algorithm::ES256 | Algorithm::ES384 => Self::Ec,
            Algorithm::EdDSA => Self::Okp,
        }
    }

    /// Family for a JWK `kty` value, if it is one we can verify with.
    #[must_use]
    pub fn from_kty(kty: &str) -> Option<Self> {
        match kty {
            "RSA" => Some(Self::Rsa),
            "EC" => Some(Self::Ec),
            "OKP" => Some(Self::Okp),
            _ => None,
        }
    }
}

/// Keep only the algorithms usable with a key of `family`, preserving order.
#[must_use]
pub fn algorithms_for_family(algorithms: &[Algorithm], family: AlgorithmFamily) -> Vec<Algorithm> {
    algorithms
        .iter()
        .copied()
        .filter(|alg| AlgorithmFamily::of(*alg) == family)
        .collect()
}

// =============================================================================
// Functions
// =============================================================================

/// Extract the `kid` (key ID) from a JWT header without verifying the signature.
///
/// Used to select the signing key from the issuer's JWKS when several keys
/// are published at once (e.g. during key rotation).
///
/// # Security
///
/// - Token size is checked BEFORE any parsing
/// - This function does NOT validate the token signature
/// - The `kid` value must only be used for key lookup in a trusted JWKS
///
/// # Errors
///
/// - `TokenTooLarge` - Token exceeds `MAX_JWT_SIZE_BYTES`
/// - `MalformedToken` - Wrong structure, bad base64, or invalid header JSON
/// - `MissingKid` - Header has no `kid`, or `kid` is not a non-empty string
pub fn extract_kid(token: &str) -> Result<String, JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    // JWT format: header.payload.signature
    let mut parts = token.split('.');
    let (Some(header_part), Some(_), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        tracing::debug!(target: "common.jwt", "Token rejected: invalid JWT format");
        return Err(JwtValidationError::MalformedToken);
    };

    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtValidationError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtValidationError::MalformedToken
    })?;

    // Reject empty kid values: an empty string never names a published key
    header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtValidationError::MissingKid)
}
