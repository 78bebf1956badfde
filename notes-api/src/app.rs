use aide::scalar::Scalar;
use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    errors::{self, on_error, ErrorResponse},
    notes::{self, NoteStore},
    openapi::{self, aide::axum::ApiRouter, OpenApi},
    state::AppState,
};

/// Builds the application router around an already opened store.
pub fn create(store: NoteStore) -> (Router, OpenApi) {
    let mut api = OpenApi::default();

    let state = AppState { store };

    let docs_router = axum::Router::new()
        .route(
            "/__docs__",
            get(Scalar::new("/__docs__/spec.json").with_title("Notes API").axum_handler()),
        )
        .route("/__docs__/spec.json", get(serve_docs));

    let ops_router = axum::Router::new()
        .route("/__version__", get(version))
        .route("/__heartbeat__", get(heartbeat))
        .route("/__lbheartbeat__", get(lbheartbeat))
        .with_state(state.clone());

    let app = ApiRouter::new()
        .merge(docs_router)
        .merge(ops_router)
        .merge(notes::router(state))
        .finish_api_with(&mut api, |t| {
            t.title("Notes").default_response::<openapi::Json<ErrorResponse>>()
        })
        .layer(
            ServiceBuilder::new()
                .layer(cors())
                .layer(Extension(Arc::new(api.clone())))
                .layer(middleware::from_fn(on_error)),
        );

    (app, api)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

async fn version() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn heartbeat(State(store): State<NoteStore>) -> errors::Result<impl IntoResponse> {
    store.ping().await?;

    Ok(Json(json!({
        "status": "ok",
    })))
}

async fn lbheartbeat() -> impl IntoResponse {
    ""
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoResponse {
    Json(api.as_ref()).into_response()
}
