//! Casting service configuration.
//!
//! Configuration is loaded from environment variables. The database URL is
//! redacted in Debug output.

use common::jwt::{AlgorithmFamily, DEFAULT_LEEWAY, MAX_CLOCK_SKEW};
use jsonwebtoken::Algorithm;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default identity provider tenant domain.
pub const DEFAULT_AUTH0_DOMAIN: &str = "gs-prod.auth0.com";

/// Default expected `aud` claim.
pub const DEFAULT_API_AUDIENCE: &str = "casting";

/// Default allowed signing algorithms (comma-separated).
pub const DEFAULT_ALGORITHMS: &str = "RS256";

/// Default JWKS cache TTL in seconds (5 minutes).
pub const DEFAULT_JWKS_CACHE_TTL_SECONDS: u64 = 300;

/// Casting service configuration.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Identity provider tenant domain, e.g. "gs-prod.auth0.com".
    pub auth0_domain: String,

    /// Expected `aud` claim.
    pub api_audience: String,

    /// Signing algorithms a token may use.
    pub allowed_algorithms: Vec<Algorithm>,

    /// JWKS endpoint. Derived from the domain unless overridden.
    pub jwks_url: String,

    /// How long fetched signing keys are trusted before refetching.
    pub jwks_cache_ttl_seconds: u64,

    /// Leeway applied to `exp`/`nbf` checks.
    pub jwt_leeway_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("auth0_domain", &self.auth0_domain)
            .field("api_audience", &self.api_audience)
            .field("allowed_algorithms", &self.allowed_algorithms)
            .field("jwks_url", &self.jwks_url)
            .field("jwks_cache_ttl_seconds", &self.jwks_cache_ttl_seconds)
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid identity provider domain: {0}")]
    InvalidDomain(String),

    #[error("Invalid signing algorithm configuration: {0}")]
    InvalidAlgorithms(String),

    #[error("Invalid JWKS cache TTL configuration: {0}")]
    InvalidJwksCacheTtl(String),

    #[error("Invalid JWT leeway configuration: {0}")]
    InvalidJwtLeeway(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let auth0_domain = vars
            .get("AUTH0_DOMAIN")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_AUTH0_DOMAIN.to_string());

        // The issuer is built as https://<domain>/, so a scheme or path here
        // would produce an issuer no token can match
        if auth0_domain.is_empty() || auth0_domain.contains('/') {
            return Err(ConfigError::InvalidDomain(format!(
                "AUTH0_DOMAIN must be a bare host name, got '{}'",
                auth0_domain
            )));
        }

        let api_audience = vars
            .get("API_AUDIENCE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_API_AUDIENCE.to_string());

        let allowed_algorithms = parse_algorithms(
            vars.get("AUTH0_ALGORITHMS")
                .map(String::as_str)
                .unwrap_or(DEFAULT_ALGORITHMS),
        )?;

        let jwks_url = vars
            .get("JWKS_URL")
            .cloned()
            .unwrap_or_else(|| format!("https://{}/.well-known/jwks.json", auth0_domain));

        let jwks_cache_ttl_seconds = if let Some(value_str) = vars.get("JWKS_CACHE_TTL_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwksCacheTtl(format!(
                    "JWKS_CACHE_TTL_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidJwksCacheTtl(
                    "JWKS_CACHE_TTL_SECONDS must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_JWKS_CACHE_TTL_SECONDS
        };

        let jwt_leeway_seconds = if let Some(value_str) = vars.get("JWT_LEEWAY_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtLeeway(format!(
                    "JWT_LEEWAY_SECONDS must be a valid non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value > MAX_CLOCK_SKEW.as_secs() {
                return Err(ConfigError::InvalidJwtLeeway(format!(
                    "JWT_LEEWAY_SECONDS must not exceed {} seconds, got {}",
                    MAX_CLOCK_SKEW.as_secs(),
                    value
                )));
            }

            value
        } else {
            DEFAULT_LEEWAY.as_secs()
        };

        Ok(Config {
            database_url,
            bind_address,
            auth0_domain,
            api_audience,
            allowed_algorithms,
            jwks_url,
            jwks_cache_ttl_seconds,
            jwt_leeway_seconds,
        })
    }

    /// Expected `iss` claim: `https://<domain>/`.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.auth0_domain)
    }
}

/// Parse a comma-separated algorithm list such as "RS256,RS384".
fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();

    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let alg = Algorithm::from_str(name).map_err(|_| {
            ConfigError::InvalidAlgorithms(format!("unknown algorithm '{}'", name))
        })?;

        if AlgorithmFamily::of(alg) == AlgorithmFamily::Hmac {
            return Err(ConfigError::InvalidAlgorithms(format!(
                "shared-secret algorithm '{}' cannot be used with a public key set",
                name
            )));
        }

        if !algorithms.contains(&alg) {
            algorithms.push(alg);
        }
    }

    if algorithms.is_empty() {
        return Err(ConfigError::InvalidAlgorithms(
            "AUTH0_ALGORITHMS must name at least one algorithm".to_string(),
        ));
    }

    Ok(algorithms)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([(
            "DATABASE_URL".to_string(),
            "postgresql://localhost/casting_test".to_string(),
        )])
    }

    #[test]
    fn test_from_vars_success_with_defaults() {
        let config = Config::from_vars(&base_vars()).expect("Config should load successfully");

        assert_eq!(config.database_url, "postgresql://localhost/casting_test");
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.auth0_domain, "gs-prod.auth0.com");
        assert_eq!(config.api_audience, "casting");
        assert_eq!(config.allowed_algorithms, vec![Algorithm::RS256]);
        assert_eq!(
            config.jwks_url,
            "https://gs-prod.auth0.com/.well-known/jwks.json"
        );
        assert_eq!(config.jwks_cache_ttl_seconds, DEFAULT_JWKS_CACHE_TTL_SECONDS);
        assert_eq!(config.jwt_leeway_seconds, 0);
        assert_eq!(config.issuer(), "https://gs-prod.auth0.com/");
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let mut vars = base_vars();
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:9000".to_string());
        vars.insert("AUTH0_DOMAIN".to_string(), "casting.eu.auth0.com".to_string());
        vars.insert("API_AUDIENCE".to_string(), "casting-api".to_string());
        vars.insert("AUTH0_ALGORITHMS".to_string(), "RS256, PS256".to_string());
        vars.insert("JWKS_CACHE_TTL_SECONDS".to_string(), "60".to_string());
        vars.insert("JWT_LEEWAY_SECONDS".to_string(), "30".to_string());

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.api_audience, "casting-api");
        assert_eq!(
            config.allowed_algorithms,
            vec![Algorithm::RS256, Algorithm::PS256]
        );
        assert_eq!(
            config.jwks_url,
            "https://casting.eu.auth0.com/.well-known/jwks.json"
        );
        assert_eq!(config.issuer(), "https://casting.eu.auth0.com/");
        assert_eq!(config.jwks_cache_ttl_seconds, 60);
        assert_eq!(config.jwt_leeway_seconds, 30);
    }

    #[test]
    fn test_jwks_url_override_keeps_domain_issuer() {
        let mut vars = base_vars();
        vars.insert(
            "JWKS_URL".to_string(),
            "http://127.0.0.1:9999/.well-known/jwks.json".to_string(),
        );

        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.jwks_url, "http://127.0.0.1:9999/.well-known/jwks.json");
        assert_eq!(config.issuer(), "https://gs-prod.auth0.com/");
    }

    #[test]
    fn test_from_vars_missing_database_url() {
        let result = Config::from_vars(&HashMap::new());
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "DATABASE_URL"));
    }

    #[test]
    fn test_domain_rejects_scheme() {
        let mut vars = base_vars();
        vars.insert(
            "AUTH0_DOMAIN".to_string(),
            "https://gs-prod.auth0.com".to_string(),
        );

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidDomain(msg)) if msg.contains("bare host")));
    }

    #[test]
    fn test_domain_rejects_empty() {
        let mut vars = base_vars();
        vars.insert("AUTH0_DOMAIN".to_string(), "  ".to_string());

        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidDomain(_))
        ));
    }

    #[test]
    fn test_algorithms_reject_unknown() {
        let mut vars = base_vars();
        vars.insert("AUTH0_ALGORITHMS".to_string(), "RS256,XX999".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidAlgorithms(msg)) if msg.contains("XX999"))
        );
    }

    #[test]
    fn test_algorithms_reject_hmac() {
        let mut vars = base_vars();
        vars.insert("AUTH0_ALGORITHMS".to_string(), "HS256".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidAlgorithms(msg)) if msg.contains("shared-secret"))
        );
    }

    #[test]
    fn test_algorithms_reject_empty_list() {
        let mut vars = base_vars();
        vars.insert("AUTH0_ALGORITHMS".to_string(), " , ".to_string());

        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidAlgorithms(_))
        ));
    }

    #[test]
    fn test_algorithms_deduplicated() {
        let mut vars = base_vars();
        vars.insert("AUTH0_ALGORITHMS".to_string(), "RS256,RS256,EdDSA".to_string());

        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(
            config.allowed_algorithms,
            vec![Algorithm::RS256, Algorithm::EdDSA]
        );
    }

    #[test]
    fn test_jwks_cache_ttl_rejects_zero() {
        let mut vars = base_vars();
        vars.insert("JWKS_CACHE_TTL_SECONDS".to_string(), "0".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidJwksCacheTtl(msg)) if msg.contains("must be greater than 0"))
        );
    }

    #[test]
    fn test_jwks_cache_ttl_rejects_non_numeric() {
        let mut vars = base_vars();
        vars.insert("JWKS_CACHE_TTL_SECONDS".to_string(), "five".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidJwksCacheTtl(msg)) if msg.contains("must be a valid positive integer"))
        );
    }

    #[test]
    fn test_jwt_leeway_accepts_max() {
        let mut vars = base_vars();
        vars.insert("JWT_LEEWAY_SECONDS".to_string(), "600".to_string());

        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.jwt_leeway_seconds, 600);
    }

    #[test]
    fn test_jwt_leeway_rejects_too_large() {
        let mut vars = base_vars();
        vars.insert("JWT_LEEWAY_SECONDS".to_string(), "601".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidJwtLeeway(msg)) if msg.contains("must not exceed 600"))
        );
    }

    #[test]
    fn test_jwt_leeway_rejects_negative() {
        let mut vars = base_vars();
        vars.insert("JWT_LEEWAY_SECONDS".to_string(), "-5".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidJwtLeeway(msg)) if msg.contains("non-negative integer"))
        );
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = Config::from_vars(&base_vars()).unwrap();

        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("postgresql://"));
        assert!(!debug_output.contains("casting_test"));
    }
}
