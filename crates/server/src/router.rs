use super::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route(
            "/api/farms/{farm_id}/sensors",
            get(handlers::farm_sensors_handler),
        )
        .route(
            "/api/farms/{farm_id}/history",
            get(handlers::farm_history_handler),
        )
        .route("/api/knowledge/{crop}", get(handlers::crop_knowledge_handler))
        .route("/api/diagnose/{farm_id}", post(handlers::diagnose_handler))
        .route("/api/chat", post(handlers::chat_handler))
        .route("/api/context", post(handlers::context_handler))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
