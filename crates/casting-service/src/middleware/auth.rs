//! Permission-gated authentication middleware for protected routes.
//!
//! Extracts the bearer token from the Authorization header, validates it
//! against the identity provider's JWKS, checks the route's required
//! permission, and injects the verified claims into request extensions.
//!
//! Each protected method route carries its own [`PermissionGate`]:
//!
//! ```rust,ignore
//! get(list_actors).route_layer(middleware::from_fn_with_state(
//!     PermissionGate::new(validator.clone(), "get:actors"),
//!     require_permission,
//! ))
//! ```

use crate::auth::{check_permission, Claims, JwtValidator};
use crate::errors::AuthError;
use crate::observability::metrics::record_auth_rejection;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::instrument;

/// State for the permission middleware: the shared validator plus the
/// permission one route requires.
#[derive(Clone)]
pub struct PermissionGate {
    /// JWT validator with JWKS client.
    pub jwt_validator: Arc<JwtValidator>,

    /// Permission string the route requires, e.g. `"post:actors"`.
    pub permission: &'static str,
}

impl PermissionGate {
    pub fn new(jwt_validator: Arc<JwtValidator>, permission: &'static str) -> Self {
        Self {
            jwt_validator,
            permission,
        }
    }

    /// Run the full gate: extract, verify, check permission.
    ///
    /// The first failing stage's rejection is returned untouched.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = extract_bearer_token(headers)?;
        let claims = self.jwt_validator.validate(token).await?;
        check_permission(self.permission, &claims)?;
        Ok(claims)
    }
}

/// Extract the bearer token from request headers.
///
/// # Authorization Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// The scheme is matched case-insensitively and parts are split on any
/// ASCII whitespace. The token is returned verbatim.
///
/// # Errors
///
/// - `HeaderMissing` - no header, or a blank value
/// - `NotBearerScheme` - first part is not `bearer`
/// - `TokenNotFound` - scheme without a token
/// - `TooManyParts` - more than two whitespace-separated parts
/// - `MalformedToken` - the token is not valid UTF-8
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .map(HeaderValue::as_bytes)
        .filter(|value| !value.iter().all(u8::is_ascii_whitespace))
        .ok_or(AuthError::HeaderMissing)?;

    let mut parts = auth_header
        .split(u8::is_ascii_whitespace)
        .filter(|part| !part.is_empty());

    let scheme = parts.next().ok_or(AuthError::HeaderMissing)?;
    if !scheme.eq_ignore_ascii_case(b"bearer") {
        return Err(AuthError::NotBearerScheme);
    }

    let token = parts.next().ok_or(AuthError::TokenNotFound)?;
    if parts.next().is_some() {
        return Err(AuthError::TooManyParts);
    }

    std::str::from_utf8(token).map_err(|_| AuthError::MalformedToken)
}

/// Middleware that admits a request only if its token grants the gate's
/// permission.
///
/// # Response
///
/// - Rejection rendered with its own status (401, 400 or 503); 401s carry
///   a `WWW-Authenticate` header
/// - Otherwise continues to the handler with [`Claims`] in extensions
#[instrument(skip_all, name = "casting.middleware.auth")]
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = gate.authorize(req.headers()).await.map_err(|err| {
        tracing::debug!(
            target: "casting.middleware.auth",
            permission = gate.permission,
            code = err.code(),
            status = err.status_code().as_u16(),
            reason = %err,
            "Request rejected by token gate"
        );
        record_auth_rejection(err.code(), err.status_code().as_u16());
        err
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
