use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{self, AppState};
use crate::middleware::resolve_principal_middleware;

/// Full application router. `main` serves it; tests drive it with `oneshot`.
pub fn build_router(state: AppState) -> Router {
    let settings = crate::config::config();
    let mut router = Router::new()
        .route("/health", get(handlers::health_get))
        .merge(api_routes(state.clone()));

    if settings.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if settings.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/policies", get(handlers::policies_get))
        .route("/api/whoami", get(handlers::whoami_get))
        .route("/api/authorize/:table/:operation", post(handlers::authorize_post))
        // Principal resolved once here, before any handler runs
        .route_layer(middleware::from_fn_with_state(state, resolve_principal_middleware))
}
