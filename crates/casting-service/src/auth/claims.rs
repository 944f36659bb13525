//! JWT claims structure.
//!
//! Contains the claims extracted from validated JWTs. The `sub` field is
//! redacted in Debug output to prevent exposure in logs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The `aud` claim: a single audience or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    /// Check whether `audience` is one of the token's audiences.
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == audience,
            Audience::Multiple(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// JWT Claims structure for validated tokens.
///
/// Only ever produced by [`JwtValidator::validate`](crate::auth::JwtValidator::validate),
/// so `iss` and `aud` are always present and already checked against the
/// configured issuer and audience. They are optional in the type only so a
/// token missing them is reported as a claims failure rather than a parse
/// failure.
///
/// Claims this service does not interpret (`azp`, `scope`, `gty`, ...) are
/// kept in `extra`, so serializing a `Claims` reproduces the token payload.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer, `https://<domain>/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject (user id or `<client>@clients`) - redacted in Debug output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Audience(s) the token was issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// RBAC permissions granted to this token, e.g. `["get:movies"]`.
    ///
    /// `None` when the claim is absent (or null), which is distinct from an
    /// empty grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    /// Remaining claims, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("iss", &self.iss)
            .field("sub", &"[REDACTED]")
            .field("aud", &self.aud)
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("permissions", &self.permissions)
            .field("extra_claims", &self.extra.len())
            .finish()
    }
}

impl Claims {
    /// Check if the token grants `permission`.
    ///
    /// Exact string match only; there is no wildcard or hierarchy.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|granted| granted.iter().any(|p| p == permission))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> Value {
        json!({
            "iss": "https://gs-prod.auth0.com/",
            "sub": "auth0|5f1c0ffee",
            "aud": ["casting", "https://gs-prod.auth0.com/userinfo"],
            "iat": 1_700_000_000,
            "exp": 1_700_086_400,
            "azp": "spa-client",
            "scope": "openid profile email",
            "permissions": ["get:actors", "get:movies"]
        })
    }

    #[test]
    fn test_claims_debug_redacts_sub() {
        let claims: Claims = serde_json::from_value(sample_payload()).unwrap();

        let debug_str = format!("{:?}", claims);

        assert!(
            !debug_str.contains("5f1c0ffee"),
            "Debug output should not contain actual sub value"
        );
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_claims_preserve_payload() {
        let payload = sample_payload();
        let claims: Claims = serde_json::from_value(payload.clone()).unwrap();

        assert_eq!(claims.extra.get("azp"), Some(&json!("spa-client")));
        assert_eq!(serde_json::to_value(&claims).unwrap(), payload);
    }

    #[test]
    fn test_has_permission_exact_match_only() {
        let claims: Claims = serde_json::from_value(sample_payload()).unwrap();

        assert!(claims.has_permission("get:actors"));
        assert!(claims.has_permission("get:movies"));
        assert!(!claims.has_permission("delete:movies"));
        assert!(!claims.has_permission("get:movie"));
        assert!(!claims.has_permission("get:*"));
    }

    #[test]
    fn test_permissions_absent_vs_empty() {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("permissions");
        let absent: Claims = serde_json::from_value(payload.clone()).unwrap();
        assert!(absent.permissions.is_none());

        payload["permissions"] = json!(null);
        let null: Claims = serde_json::from_value(payload.clone()).unwrap();
        assert!(null.permissions.is_none());

        payload["permissions"] = json!([]);
        let empty: Claims = serde_json::from_value(payload).unwrap();
        assert_eq!(empty.permissions, Some(vec![]));
        assert!(!empty.has_permission("get:actors"));
    }

    #[test]
    fn test_audience_single_and_multiple() {
        let single: Audience = serde_json::from_value(json!("casting")).unwrap();
        assert_eq!(single, Audience::Single("casting".to_string()));
        assert!(single.contains("casting"));
        assert!(!single.contains("other"));

        let multiple: Audience = serde_json::from_value(json!(["a", "casting"])).unwrap();
        assert!(multiple.contains("casting"));
        assert!(!multiple.contains("b"));
    }
}
