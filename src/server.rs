use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::api;
use crate::config::Config;
use crate::store::StoreGateway;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<StoreGateway>,
}

impl AppState {
    pub fn new(config: Config, gateway: StoreGateway) -> Self {
        Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/movies", get(api::list_movies))
        .route("/api/register", post(api::register_attendance))
        .route("/api/favorites", post(api::create_favorite))
        .route("/api/favorites/:user_id", get(api::list_favorites));

    let cors = cors_layer(&state.config.frontend_origin);

    let routes = Router::new()
        .route("/", get(api::health))
        .merge(api_routes)
        .fallback(fallback_handler)
        .with_state(state);

    // Path normalization has to run before routing, so the routes sit
    // behind it as a fallback service.
    let normalized = axum::middleware::from_fn(crate::middleware::normalize_path).layer(routes);

    Router::new()
        .fallback_service(normalized)
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(frontend_origin: &str) -> CorsLayer {
    let origin = frontend_origin.trim();
    let allow_origin = if origin.is_empty() || origin == "*" {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = origin
            .split(',')
            .filter_map(|o| match HeaderValue::from_str(o.trim()) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid frontend origin {:?}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn fallback_handler(req: Request) -> impl IntoResponse {
    if req.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
        .into_response()
}
