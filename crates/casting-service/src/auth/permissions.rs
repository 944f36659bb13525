//! Permission enforcement against verified claims.

use crate::auth::claims::Claims;
use crate::errors::AuthError;

/// Check that `claims` grants `required`.
///
/// A token without a `permissions` claim is malformed for this API and is
/// rejected with `PermissionsMissing` (400). A token whose `permissions` does
/// not contain `required` is an authorization denial, `PermissionDenied` (401).
pub fn check_permission(required: &str, claims: &Claims) -> Result<(), AuthError> {
    let Some(granted) = claims.permissions.as_ref() else {
        tracing::debug!(target: "casting.auth.permissions", required = %required, "Token has no permissions claim");
        return Err(AuthError::PermissionsMissing);
    };

    if claims.has_permission(required) {
        Ok(())
    } else {
        tracing::debug!(
            target: "casting.auth.permissions",
            required = %required,
            granted = granted.len(),
            "Required permission not granted"
        );
        Err(AuthError::PermissionDenied)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims_with(permissions: serde_json::Value) -> Claims {
        let mut payload = json!({
            "iss": "https://gs-prod.auth0.com/",
            "sub": "auth0|director",
            "aud": "casting",
            "exp": 4_102_444_800_i64,
        });
        if !permissions.is_null() {
            payload["permissions"] = permissions;
        }
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn test_granted_permission_passes() {
        let claims = claims_with(json!(["get:movies"]));
        assert_eq!(check_permission("get:movies", &claims), Ok(()));
    }

    #[test]
    fn test_missing_permission_is_denied() {
        let claims = claims_with(json!(["get:movies"]));
        assert_eq!(
            check_permission("delete:movies", &claims),
            Err(AuthError::PermissionDenied)
        );
    }

    #[test]
    fn test_absent_permissions_claim_is_missing_not_denied() {
        let claims = claims_with(serde_json::Value::Null);
        for required in ["get:actors", "post:actors", "delete:movies"] {
            assert_eq!(
                check_permission(required, &claims),
                Err(AuthError::PermissionsMissing)
            );
        }
    }

    #[test]
    fn test_empty_permissions_is_denied() {
        let claims = claims_with(json!([]));
        assert_eq!(
            check_permission("get:actors", &claims),
            Err(AuthError::PermissionDenied)
        );
    }

    #[test]
    fn test_no_prefix_or_case_folding() {
        let claims = claims_with(json!(["get:actors", "PATCH:movies"]));
        assert_eq!(
            check_permission("get:actor", &claims),
            Err(AuthError::PermissionDenied)
        );
        assert_eq!(
            check_permission("patch:movies", &claims),
            Err(AuthError::PermissionDenied)
        );
    }
}
