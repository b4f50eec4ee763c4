// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{extraction, key, session},
    state::AppState,
};

/// Assembles the main application router.
///
/// * `/upload-answer-key` is the bare proxy the browser front end calls.
/// * `/api/key` and `/api/session` expose the hosted answer key and test.
/// * Applies global middleware (Trace, CORS, body limit).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.allowed_origin.clone())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    let key_routes = Router::new()
        .route("/", get(key::get_key))
        .route("/extract", post(key::extract_key))
        .route("/import", post(key::import_key))
        .route("/export", get(key::export_key))
        .route("/range", put(key::set_range))
        .route("/questions", post(key::add_question))
        .route(
            "/questions/{question}",
            put(key::edit_answer).delete(key::remove_question),
        );

    let session_routes = Router::new()
        .route("/", get(session::get_session))
        .route("/start", post(session::start))
        .route("/pause", post(session::pause))
        .route("/submit", post(session::submit))
        .route("/reset", post(session::reset))
        .route("/duration", put(session::set_duration))
        .route("/answers/{question}", put(session::set_answer));

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    Router::new()
        .route("/upload-answer-key", post(extraction::upload_answer_key))
        .nest("/api/key", key_routes)
        .nest("/api/session", session_routes)
        .layer(middleware)
        .with_state(state)
}
