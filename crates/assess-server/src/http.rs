/// HTTP surface: health, recommendation and service-info endpoints.
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use assess_common::api::{ErrorResponse, HealthResponse, RecommendParams, RecommendResponse};
use assess_engine::error::RecommendError;
use assess_engine::pipeline::Recommender;

use crate::server::catalog_info;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error(transparent)]
    Recommend(#[from] RecommendError),

    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        warn!(error = %self, "request rejected");
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

pub fn router(recommender: Arc<Recommender>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/recommend", post(recommend_handler))
        .route("/api", get(api_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(recommender)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Assessment recommender is running".to_string(),
    })
}

async fn recommend_handler(
    State(recommender): State<Arc<Recommender>>,
    payload: Result<Json<RecommendParams>, JsonRejection>,
) -> Result<Json<RecommendResponse>, HttpError> {
    let Json(params) = payload?;
    Ok(Json(recommender.respond(&params).await?))
}

async fn api_handler(State(recommender): State<Arc<Recommender>>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "assess-recommender",
        "version": env!("CARGO_PKG_VERSION"),
        "catalog": catalog_info(&recommender),
        "endpoints": {
            "GET /health": "liveness check",
            "POST /recommend": "body {\"query\": string, \"top_k\": 1-10 (optional, default 10)}",
            "GET /api": "this document",
        },
    }))
}
