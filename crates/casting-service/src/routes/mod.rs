//! HTTP routes for the casting service.
//!
//! Defines the Axum router and application state.

use crate::auth::JwtValidator;
use crate::config::Config;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_permission, PermissionGate};
use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,
}

/// Attach a permission gate to one method route.
fn gated(
    route: MethodRouter<Arc<AppState>>,
    validator: &Arc<JwtValidator>,
    permission: &'static str,
) -> MethodRouter<Arc<AppState>> {
    route.route_layer(middleware::from_fn_with_state(
        PermissionGate::new(Arc::clone(validator), permission),
        require_permission,
    ))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness check (simple "OK") - public
/// - `/ready` - Readiness check (checks DB) - public
/// - `/metrics` - Prometheus metrics endpoint - public
/// - `/api/actors`, `/api/actors/{id}` - actor CRUD, `<method>:actors` permissions
/// - `/api/movies`, `/api/movies/{id}` - movie CRUD, `<method>:movies` permissions
/// - TraceLayer for request logging, CORS, 30 second request timeout
/// - HTTP metrics middleware
///
/// One [`JwtValidator`] (and so one JWKS cache) is shared by every route.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let validator = Arc::new(JwtValidator::from_config(&state.config));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Protected routes, each method gated by its own permission
    let protected_routes = Router::new()
        .route(
            "/api/actors",
            gated(get(handlers::list_actors), &validator, "get:actors").merge(gated(
                post(handlers::create_actor),
                &validator,
                "post:actors",
            )),
        )
        .route(
            "/api/actors/:id",
            gated(get(handlers::get_actor), &validator, "get:actors")
                .merge(gated(
                    patch(handlers::update_actor),
                    &validator,
                    "patch:actors",
                ))
                .merge(gated(
                    delete(handlers::delete_actor),
                    &validator,
                    "delete:actors",
                )),
        )
        .route(
            "/api/movies",
            gated(get(handlers::list_movies), &validator, "get:movies").merge(gated(
                post(handlers::create_movie),
                &validator,
                "post:movies",
            )),
        )
        .route(
            "/api/movies/:id",
            gated(get(handlers::get_movie), &validator, "get:movies")
                .merge(gated(
                    patch(handlers::update_movie),
                    &validator,
                    "patch:movies",
                ))
                .merge(gated(
                    delete(handlers::delete_movie),
                    &validator,
                    "delete:movies",
                )),
        )
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. CorsLayer - Answer preflights, add CORS headers
    // 4. http_metrics_middleware - Record ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(middleware::from_fn(http_metrics_middleware))
}
