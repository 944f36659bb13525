//! Builder patterns for test data construction
//!
//! Provides a fluent API for the claims an identity provider puts in an
//! access token for this API.

use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};

/// Issuer the default test configuration expects.
pub const TEST_ISSUER: &str = "https://gs-prod.auth0.com/";

/// Audience the default test configuration expects.
pub const TEST_AUDIENCE: &str = "casting";

/// Builder for creating test JWT claims
///
/// # Example
/// ```rust,ignore
/// let claims = TestTokenBuilder::new()
///     .subject("auth0|casting-director")
///     .with_permissions(&["get:actors", "post:actors"])
///     .expires_in(3600)
///     .build();
/// let token = primary_rsa_key().sign(&claims);
/// ```
pub struct TestTokenBuilder {
    iss: String,
    sub: String,
    aud: String,
    exp: i64,
    iat: i64,
    permissions: Option<Vec<String>>,
    extra: Map<String, Value>,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    ///
    /// Defaults match the default service configuration and carry no
    /// `permissions` claim at all.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            iss: TEST_ISSUER.to_string(),
            sub: "auth0|test-user".to_string(),
            aud: TEST_AUDIENCE.to_string(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
            permissions: None,
            extra: Map::new(),
        }
    }

    /// Set the issuer
    pub fn issuer(mut self, issuer: &str) -> Self {
        self.iss = issuer.to_string();
        self
    }

    /// Set the audience
    pub fn audience(mut self, audience: &str) -> Self {
        self.aud = audience.to_string();
        self
    }

    /// Set the subject (user or `<client>@clients`)
    pub fn subject(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    /// Set the `permissions` claim
    pub fn with_permissions(mut self, permissions: &[&str]) -> Self {
        self.permissions = Some(permissions.iter().map(ToString::to_string).collect());
        self
    }

    /// Set expiration in seconds from now (negative for an expired token)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Set issued-at timestamp
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    /// Add an arbitrary claim (`azp`, `scope`, `nbf`, ...)
    pub fn claim(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Build the claims as a JSON value
    pub fn build(self) -> Value {
        let mut claims = json!({
            "iss": self.iss,
            "sub": self.sub,
            "aud": self.aud,
            "exp": self.exp,
            "iat": self.iat,
        });

        if let Some(object) = claims.as_object_mut() {
            if let Some(permissions) = self.permissions {
                object.insert("permissions".to_string(), json!(permissions));
            }
            object.extend(self.extra);
        }

        claims
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
