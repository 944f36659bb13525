//! Casting service error types.
//!
//! Two error families share one JSON envelope:
//!
//! - [`AuthError`] - rejections produced by the token gate. Each carries a
//!   stable `code`, a human readable description, and its own HTTP status.
//! - [`CastingError`] - failures of the CRUD operations behind the gate.
//!
//! ```json
//! {"success": false, "error": {"code": "token_expired", "message": "Token expired."}}
//! ```
//!
//! Messages returned to clients never contain internal details. Database
//! errors are logged server-side and replaced by a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// `WWW-Authenticate` challenge attached to every 401 response.
const WWW_AUTHENTICATE_CHALLENGE: &str = "Bearer realm=\"casting-api\", error=\"invalid_token\"";

/// Rejection produced by the token gate.
///
/// The `Display` text is the client-facing description. Several variants
/// share a `code` and differ only in description and status; in particular
/// `invalid_header` is 401 for bearer-syntax problems but 400 once a token
/// reached key lookup or signature verification, and `invalid_claims` is 401
/// for audience/issuer mismatch but 400 when `permissions` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    HeaderMissing,

    #[error("Authorization header must start with \"Bearer\".")]
    NotBearerScheme,

    #[error("Token not found.")]
    TokenNotFound,

    #[error("Authorization header must be bearer token.")]
    TooManyParts,

    #[error("Authorization malformed.")]
    MalformedToken,

    #[error("Unable to find the appropriate key.")]
    UnknownKey,

    #[error("Unable to parse authentication token.")]
    UnparseableToken,

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    IncorrectClaims,

    #[error("Permission not included in JWT.")]
    PermissionsMissing,

    #[error("Permission not found.")]
    PermissionDenied,

    #[error("Unable to fetch signing keys.")]
    KeysUnavailable,
}

impl AuthError {
    /// Stable machine-readable rejection code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::HeaderMissing => "authorization_header_missing",
            AuthError::NotBearerScheme
            | AuthError::TokenNotFound
            | AuthError::TooManyParts
            | AuthError::MalformedToken
            | AuthError::UnknownKey
            | AuthError::UnparseableToken => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::IncorrectClaims | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::PermissionDenied => "unauthorized",
            AuthError::KeysUnavailable => "jwks_unavailable",
        }
    }

    /// HTTP status the router renders this rejection with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::HeaderMissing
            | AuthError::NotBearerScheme
            | AuthError::TokenNotFound
            | AuthError::TooManyParts
            | AuthError::MalformedToken
            | AuthError::TokenExpired
            | AuthError::IncorrectClaims
            | AuthError::PermissionDenied => StatusCode::UNAUTHORIZED,
            AuthError::UnknownKey | AuthError::UnparseableToken | AuthError::PermissionsMissing => {
                StatusCode::BAD_REQUEST
            }
            AuthError::KeysUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Failures of the CRUD operations.
///
/// Maps to HTTP status codes:
/// - Database: 500 Internal Server Error
/// - NotFound: 404 Not Found
/// - BadRequest: 400 Bad Request
/// - Unprocessable: 422 Unprocessable Entity (the database refused the change)
#[derive(Debug, Error)]
pub enum CastingError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),
}

impl CastingError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CastingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CastingError::NotFound(_) => StatusCode::NOT_FOUND,
            CastingError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CastingError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetail {
            code: code.to_string(),
            message,
        },
    };

    let mut response = (status, Json(body)).into_response();

    if status == StatusCode::UNAUTHORIZED {
        if let Ok(header_value) = WWW_AUTHENTICATE_CHALLENGE.parse() {
            response
                .headers_mut()
                .insert("WWW-Authenticate", header_value);
        }
    }

    response
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.code(), self.to_string())
    }
}

impl IntoResponse for CastingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match self {
            CastingError::Database(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "casting.database", error = %err, "Database operation failed");
                (
                    "database_error",
                    "An internal database error occurred".to_string(),
                )
            }
            CastingError::NotFound(resource) => ("not_found", resource),
            CastingError::BadRequest(reason) => ("bad_request", reason),
            CastingError::Unprocessable(reason) => ("unprocessable", reason),
        };

        error_response(status, code, message)
    }
}

/// SQLSTATE classes for rows the database refuses to store: 22 (data
/// exception) and 23 (integrity constraint violation).
fn is_rejected_write(sqlstate: &str) -> bool {
    sqlstate.starts_with("22") || sqlstate.starts_with("23")
}

impl From<sqlx::Error> for CastingError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().is_some_and(|code| is_rejected_write(&code)) {
                tracing::warn!(
                    target: "casting.database",
                    sqlstate = ?db_err.code(),
                    constraint = ?db_err.constraint(),
                    error = %db_err,
                    "Database rejected the change"
                );
                return CastingError::Unprocessable("unprocessable".to_string());
            }
        }

        CastingError::Database(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_auth_error_codes() {
        assert_eq!(AuthError::HeaderMissing.code(), "authorization_header_missing");
        assert_eq!(AuthError::NotBearerScheme.code(), "invalid_header");
        assert_eq!(AuthError::TokenNotFound.code(), "invalid_header");
        assert_eq!(AuthError::TooManyParts.code(), "invalid_header");
        assert_eq!(AuthError::MalformedToken.code(), "invalid_header");
        assert_eq!(AuthError::UnknownKey.code(), "invalid_header");
        assert_eq!(AuthError::UnparseableToken.code(), "invalid_header");
        assert_eq!(AuthError::TokenExpired.code(), "token_expired");
        assert_eq!(AuthError::IncorrectClaims.code(), "invalid_claims");
        assert_eq!(AuthError::PermissionsMissing.code(), "invalid_claims");
        assert_eq!(AuthError::PermissionDenied.code(), "unauthorized");
        assert_eq!(AuthError::KeysUnavailable.code(), "jwks_unavailable");
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(AuthError::HeaderMissing.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::NotBearerScheme.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::TokenNotFound.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::TooManyParts.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MalformedToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::UnknownKey.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::UnparseableToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::IncorrectClaims.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::PermissionsMissing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::PermissionDenied.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::KeysUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_auth_error_descriptions() {
        assert_eq!(
            AuthError::HeaderMissing.to_string(),
            "Authorization header is expected."
        );
        assert_eq!(
            AuthError::NotBearerScheme.to_string(),
            "Authorization header must start with \"Bearer\"."
        );
        assert_eq!(AuthError::PermissionDenied.to_string(), "Permission not found.");
    }

    #[tokio::test]
    async fn test_auth_error_into_response_401_has_challenge() {
        let response = AuthError::TokenExpired.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let www_auth = response.headers().get("WWW-Authenticate").unwrap();
        assert!(www_auth
            .to_str()
            .unwrap()
            .contains("Bearer realm=\"casting-api\""));

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "token_expired");
        assert_eq!(body["error"]["message"], "Token expired.");
    }

    #[tokio::test]
    async fn test_auth_error_into_response_400_has_no_challenge() {
        let response = AuthError::PermissionsMissing.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get("WWW-Authenticate").is_none());

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "invalid_claims");
        assert_eq!(body["error"]["message"], "Permission not included in JWT.");
    }

    #[test]
    fn test_display_casting_errors() {
        assert_eq!(
            CastingError::Database("connection failed".to_string()).to_string(),
            "Database error: connection failed"
        );
        assert_eq!(
            CastingError::NotFound("actor 7".to_string()).to_string(),
            "Not found: actor 7"
        );
    }

    #[test]
    fn test_casting_error_status_codes() {
        assert_eq!(
            CastingError::Database("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            CastingError::NotFound("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CastingError::BadRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CastingError::Unprocessable("x".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_into_response_database_error_is_generic() {
        let response = CastingError::Database("password authentication failed".to_string())
            .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "database_error");
        assert_eq!(body["error"]["message"], "An internal database error occurred");
    }

    #[tokio::test]
    async fn test_into_response_not_found() {
        let response = CastingError::NotFound("Movie not found".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["message"], "Movie not found");
    }

    #[tokio::test]
    async fn test_into_response_bad_request() {
        let response = CastingError::BadRequest("age must be between 0 and 150".to_string())
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[test]
    fn test_rejected_write_sqlstates() {
        // check, unique, not-null and foreign key violations
        assert!(is_rejected_write("23514"));
        assert!(is_rejected_write("23505"));
        assert!(is_rejected_write("23502"));
        assert!(is_rejected_write("23503"));
        // value too long, invalid text encoding
        assert!(is_rejected_write("22001"));
        assert!(is_rejected_write("22021"));
        // connection failure, undefined table, query canceled
        assert!(!is_rejected_write("08006"));
        assert!(!is_rejected_write("42P01"));
        assert!(!is_rejected_write("57014"));
    }

    #[test]
    fn test_non_database_sqlx_errors_are_database_errors() {
        assert!(matches!(
            CastingError::from(sqlx::Error::PoolTimedOut),
            CastingError::Database(_)
        ));
        assert!(matches!(
            CastingError::from(sqlx::Error::RowNotFound),
            CastingError::Database(_)
        ));
    }

    #[tokio::test]
    async fn test_into_response_unprocessable() {
        let response = CastingError::Unprocessable("unprocessable".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "unprocessable");
    }
}
