//! JWKS client for fetching and caching the identity provider's signing keys.
//!
//! The JWKS (JSON Web Key Set) client fetches public keys from the issuer's
//! `/.well-known/jwks.json` endpoint and caches them with a configurable TTL.
//!
//! # Key rotation
//!
//! A key ID that is missing from a still-fresh cache triggers one refetch
//! before the lookup fails, so newly published keys are picked up without
//! waiting for the TTL. Concurrent misses may each refetch; the last write
//! wins and every write is a complete key set.

use crate::errors::AuthError;
use crate::observability::metrics;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::instrument;

/// Default cache TTL in seconds (5 minutes).
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Timeout for a single JWKS fetch.
const FETCH_TIMEOUT_SECONDS: u64 = 10;

/// JSON Web Key from the JWKS endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" for Auth0 tenants, "OKP" for Ed25519).
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    ///
    /// Optional in a key set; a key without one can never be selected.
    #[serde(default)]
    pub kid: Option<String>,

    /// Key use (should be "sig" for signing).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    /// RSA modulus (base64url encoded).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url encoded).
    #[serde(default)]
    pub e: Option<String>,

    /// Algorithm the key is intended for, e.g. "RS256".
    #[serde(default)]
    pub alg: Option<String>,

    /// Curve name for OKP and EC keys ("Ed25519", "P-256").
    #[serde(default)]
    pub crv: Option<String>,

    /// OKP public key, or EC x coordinate (base64url encoded).
    #[serde(default)]
    pub x: Option<String>,

    /// EC y coordinate (base64url encoded).
    #[serde(default)]
    pub y: Option<String>,
}

/// JWKS document.
///
/// Entries are kept as raw JSON so one unusable key does not reject the
/// whole set.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    /// List of JSON Web Keys.
    pub keys: Vec<serde_json::Value>,
}

impl JwksResponse {
    /// Index the selectable keys by key ID.
    ///
    /// Entries that do not parse as a JWK, or carry no `kid`, are skipped.
    fn into_key_map(self) -> HashMap<String, Jwk> {
        let mut keys = HashMap::with_capacity(self.keys.len());

        for entry in self.keys {
            let jwk: Jwk = match serde_json::from_value(entry) {
                Ok(jwk) => jwk,
                Err(e) => {
                    tracing::debug!(target: "casting.auth.jwks", error = %e, "Skipping unparseable JWKS entry");
                    continue;
                }
            };

            match jwk.kid.clone() {
                Some(kid) => {
                    keys.insert(kid, jwk);
                }
                None => {
                    tracing::debug!(target: "casting.auth.jwks", kty = %jwk.kty, "Skipping JWKS entry without kid");
                }
            }
        }

        keys
    }
}

/// Cached JWKS data with expiry time.
struct CachedJwks {
    /// Map of key ID to JWK.
    keys: HashMap<String, Jwk>,

    /// When this cache entry expires.
    expires_at: Instant,
}

enum CacheLookup {
    Hit(Jwk),
    /// Cache is fresh but does not contain the key ID.
    Miss,
    /// Cache is empty or past its TTL.
    Stale,
}

/// JWKS client for fetching and caching public keys.
///
/// Shared by every request through an `Arc`; the cache starts empty and is
/// filled on first use.
pub struct JwksClient {
    /// URL to the JWKS endpoint.
    jwks_url: String,

    /// HTTP client for fetching JWKS.
    http_client: reqwest::Client,

    /// Cached JWKS data.
    cache: Arc<RwLock<Option<CachedJwks>>>,

    /// Cache TTL duration.
    cache_ttl: Duration,
}

impl JwksClient {
    /// Create a new JWKS client with the default TTL.
    pub fn new(jwks_url: String) -> Self {
        Self::with_ttl(jwks_url, Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS))
    }

    /// Create a new JWKS client with custom cache TTL.
    ///
    /// # Arguments
    ///
    /// * `jwks_url` - URL to the issuer's JWKS endpoint
    /// * `cache_ttl` - How long to cache JWKS before refreshing
    pub fn with_ttl(jwks_url: String, cache_ttl: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECONDS))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "casting.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
            cache: Arc::new(RwLock::new(None)),
            cache_ttl,
        }
    }

    /// URL keys are fetched from.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Get a JWK by key ID.
    ///
    /// Serves from cache when fresh. Refetches when the cache is empty,
    /// expired, or does not know `kid`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeysUnavailable` if the JWKS cannot be fetched.
    /// Returns `AuthError::UnknownKey` if the key ID is not published.
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        match self.lookup(kid).await {
            CacheLookup::Hit(key) => {
                tracing::debug!(target: "casting.auth.jwks", kid = %kid, "JWKS cache hit");
                return Ok(key);
            }
            CacheLookup::Miss => {
                tracing::debug!(target: "casting.auth.jwks", kid = %kid, "Key not in JWKS cache, refetching for possible rotation");
            }
            CacheLookup::Stale => {}
        }

        self.refresh().await?;

        match self.lookup(kid).await {
            CacheLookup::Hit(key) => Ok(key),
            CacheLookup::Miss | CacheLookup::Stale => {
                tracing::warn!(target: "casting.auth.jwks", kid = %kid, "Key not found in JWKS after refresh");
                Err(AuthError::UnknownKey)
            }
        }
    }

    async fn lookup(&self, kid: &str) -> CacheLookup {
        let cache = self.cache.read().await;
        match cache.as_ref() {
            Some(cached) if cached.expires_at > Instant::now() => match cached.keys.get(kid) {
                Some(key) => CacheLookup::Hit(key.clone()),
                None => CacheLookup::Miss,
            },
            _ => CacheLookup::Stale,
        }
    }

    /// Fetch the key set and replace the cache.
    ///
    /// A failed fetch leaves the previous cache untouched.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), AuthError> {
        tracing::debug!(target: "casting.auth.jwks", url = %self.jwks_url, "Fetching JWKS");

        let result = self.fetch().await;
        metrics::record_jwks_refresh(if result.is_ok() { "success" } else { "error" });
        let jwks = result?;

        let keys = jwks.into_key_map();

        tracing::info!(
            target: "casting.auth.jwks",
            key_count = keys.len(),
            "JWKS cache refreshed"
        );

        let mut cache = self.cache.write().await;
        *cache = Some(CachedJwks {
            keys,
            expires_at: Instant::now() + self.cache_ttl,
        });

        Ok(())
    }

    async fn fetch(&self) -> Result<JwksResponse, AuthError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "casting.auth.jwks", error = %e, "Failed to fetch JWKS");
                AuthError::KeysUnavailable
            })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "casting.auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AuthError::KeysUnavailable);
        }

        response.json().await.map_err(|e| {
            tracing::error!(target: "casting.auth.jwks", error = %e, "Failed to parse JWKS response");
            AuthError::KeysUnavailable
        })
    }

    /// Drop all cached keys.
    #[cfg(test)]
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }
}
