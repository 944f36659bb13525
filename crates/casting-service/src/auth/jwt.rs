//! JWT validation for the casting service.
//!
//! Validates bearer tokens using public keys fetched from the identity
//! provider's JWKS endpoint.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only the configured algorithms are accepted, narrowed to the key's family
//! - `exp` is required; audience and issuer must match the configuration
//! - Tokens are never logged

use crate::auth::claims::Claims;
use crate::auth::jwks::{Jwk, JwksClient};
use crate::config::Config;
use crate::errors::AuthError;
use common::jwt::{algorithms_for_family, extract_kid, AlgorithmFamily};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// What a token must satisfy besides a valid signature.
#[derive(Debug, Clone)]
struct Expectations {
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    leeway_seconds: u64,
}

/// JWT validator backed by the identity provider's JWKS.
pub struct JwtValidator {
    /// JWKS client for fetching public keys.
    jwks_client: Arc<JwksClient>,

    expectations: Expectations,
}

impl JwtValidator {
    /// Create a new JWT validator.
    ///
    /// # Arguments
    ///
    /// * `jwks_client` - Client for fetching public keys
    /// * `issuer` - Expected `iss`, e.g. `https://gs-prod.auth0.com/`
    /// * `audience` - Expected `aud` member
    /// * `algorithms` - Signing algorithms a token may use
    /// * `leeway_seconds` - Tolerance for `exp` and `nbf`
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        algorithms: Vec<Algorithm>,
        leeway_seconds: u64,
    ) -> Self {
        Self {
            jwks_client,
            expectations: Expectations {
                issuer,
                audience,
                algorithms,
                leeway_seconds,
            },
        }
    }

    /// Build a validator and its JWKS client from service configuration.
    pub fn from_config(config: &Config) -> Self {
        let jwks_client = Arc::new(JwksClient::with_ttl(
            config.jwks_url.clone(),
            Duration::from_secs(config.jwks_cache_ttl_seconds),
        ));

        Self::new(
            jwks_client,
            config.issuer(),
            config.api_audience.clone(),
            config.allowed_algorithms.clone(),
            config.jwt_leeway_seconds,
        )
    }

    /// Validate a JWT and return the claims.
    ///
    /// # Security Checks
    ///
    /// 1. Size check - reject tokens > 8KB before parsing
    /// 2. Extract kid from header to find the correct key
    /// 3. Fetch public key from JWKS (refetching on an unknown kid)
    /// 4. Verify signature with an allowed algorithm
    /// 5. Validate exp, nbf, aud and iss
    ///
    /// # Errors
    ///
    /// - `MalformedToken` (401) - oversized token, bad header, or no kid
    /// - `UnknownKey` (400) - kid not published by the issuer
    /// - `KeysUnavailable` (503) - JWKS could not be fetched
    /// - `TokenExpired` (401), `IncorrectClaims` (401), `UnparseableToken` (400)
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        // 1. Extract kid from JWT header (includes size check via common::jwt)
        let kid = extract_kid(token).map_err(|e| {
            tracing::debug!(target: "casting.auth.jwt", error = ?e, "Token kid extraction failed");
            AuthError::MalformedToken
        })?;

        // 2. Fetch public key from JWKS
        let jwk = self.jwks_client.get_key(&kid).await?;

        // 3. Verify signature and claims
        let claims = verify_token(token, &jwk, &self.expectations)?;

        tracing::debug!(target: "casting.auth.jwt", "Token validated successfully");
        Ok(claims)
    }
}

/// Verify JWT signature and claims against a resolved key.
fn verify_token(token: &str, jwk: &Jwk, expected: &Expectations) -> Result<Claims, AuthError> {
    let (decoding_key, family) = decoding_key(jwk)?;

    let mut algorithms = algorithms_for_family(&expected.algorithms, family);

    // A key pinned to one algorithm only verifies that algorithm
    if let Some(pinned) = jwk.alg.as_deref() {
        match Algorithm::from_str(pinned) {
            Ok(pinned) => algorithms.retain(|alg| *alg == pinned),
            Err(_) => {
                tracing::warn!(target: "casting.auth.jwt", kid = ?jwk.kid, alg = %pinned, "JWK has unrecognized algorithm");
                algorithms.clear();
            }
        }
    }

    let Some(first) = algorithms.first().copied() else {
        tracing::warn!(
            target: "casting.auth.jwt",
            kid = ?jwk.kid,
            kty = %jwk.kty,
            "No allowed algorithm matches the JWK"
        );
        return Err(AuthError::UnparseableToken);
    };

    let mut validation = Validation::new(first);
    validation.algorithms = algorithms;
    validation.leeway = expected.leeway_seconds;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.set_required_spec_claims(&["exp", "aud", "iss"]);
    validation.set_audience(&[expected.audience.as_str()]);
    validation.set_issuer(&[expected.issuer.as_str()]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "casting.auth.jwt", error = %e, "Token verification failed");
        classify_decode_error(e.kind())
    })?;

    Ok(token_data.claims)
}

/// Build a decoding key from JWK material.
fn decoding_key(jwk: &Jwk) -> Result<(DecodingKey, AlgorithmFamily), AuthError> {
    if jwk.key_use.as_deref().is_some_and(|key_use| key_use != "sig") {
        tracing::warn!(target: "casting.auth.jwt", kid = ?jwk.kid, "JWK is not a signing key");
        return Err(AuthError::UnparseableToken);
    }

    let Some(family) = AlgorithmFamily::from_kty(&jwk.kty) else {
        tracing::warn!(target: "casting.auth.jwt", kty = %jwk.kty, "Unsupported JWK key type");
        return Err(AuthError::UnparseableToken);
    };

    let key = match (family, jwk) {
        (
            AlgorithmFamily::Rsa,
            Jwk {
                n: Some(n),
                e: Some(e),
                ..
            },
        ) => DecodingKey::from_rsa_components(n, e),
        (AlgorithmFamily::Okp, Jwk { x: Some(x), .. }) => DecodingKey::from_ed_components(x),
        (
            AlgorithmFamily::Ec,
            Jwk {
                x: Some(x),
                y: Some(y),
                ..
            },
        ) => DecodingKey::from_ec_components(x, y),
        _ => {
            tracing::error!(target: "casting.auth.jwt", kid = ?jwk.kid, "JWK missing key material");
            return Err(AuthError::UnparseableToken);
        }
    };

    let key = key.map_err(|e| {
        tracing::error!(target: "casting.auth.jwt", kid = ?jwk.kid, error = %e, "Invalid JWK key material");
        AuthError::UnparseableToken
    })?;

    Ok((key, family))
}

fn classify_decode_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::IncorrectClaims,
        _ => AuthError::UnparseableToken,
    }
}
