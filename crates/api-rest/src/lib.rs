//! # API REST
//!
//! Read-only REST surface over the integration hub's aggregation store.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! The router is built around an `Arc<AggregationStore>` owned by the caller; this crate never
//! mutates the store.

#![warn(rust_2018_idioms)]

pub mod dto;

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use dto::{
    ConnectorRes, ConnectorsRes, HealthRes, HospitalRes, HospitalsRes, MetricsRes, RequestRes,
    RequestsQuery, RequestsRes, SnapshotRes,
};
use hub_core::AggregationStore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared by all handlers.
#[derive(Clone)]
struct AppState {
    store: Arc<AggregationStore>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, snapshot, list_requests, list_connectors, list_hospitals),
    components(schemas(
        HealthRes,
        MetricsRes,
        RequestRes,
        ConnectorRes,
        HospitalRes,
        SnapshotRes,
        RequestsRes,
        ConnectorsRes,
        HospitalsRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router, Swagger UI included, over `store`.
pub fn router(store: Arc<AggregationStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/snapshot", get(snapshot))
        .route("/requests", get(list_requests))
        .route("/connectors", get(list_connectors))
        .route("/hospitals", get(list_hospitals))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(AppState { store })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Integration hub REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/snapshot",
    responses(
        (status = 200, description = "Metrics, requests, connectors and hospitals", body = SnapshotRes)
    )
)]
/// Returns one consistent copy of the whole store.
#[axum::debug_handler]
async fn snapshot(State(state): State<AppState>) -> Json<SnapshotRes> {
    let snapshot = state.store.snapshot();
    tracing::debug!(
        requests = snapshot.requests.len(),
        connectors = snapshot.connectors.len(),
        hospitals = snapshot.hospitals.len(),
        "serving snapshot"
    );
    Json(snapshot.into())
}

#[utoipa::path(
    get,
    path = "/requests",
    params(RequestsQuery),
    responses(
        (status = 200, description = "Retained requests, newest first", body = RequestsRes)
    )
)]
#[axum::debug_handler]
async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestsQuery>,
) -> Json<RequestsRes> {
    let requests = state.store.snapshot().requests;
    let limit = query.limit.unwrap_or(requests.len());
    tracing::debug!(retained = requests.len(), limit, "listing requests");
    Json(RequestsRes {
        requests: requests.into_iter().take(limit).map(Into::into).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/connectors",
    responses(
        (status = 200, description = "Connector records", body = ConnectorsRes)
    )
)]
#[axum::debug_handler]
async fn list_connectors(State(state): State<AppState>) -> Json<ConnectorsRes> {
    Json(ConnectorsRes {
        connectors: state
            .store
            .snapshot()
            .connectors
            .into_iter()
            .map(Into::into)
            .collect(),
    })
}

#[utoipa::path(
    get,
    path = "/hospitals",
    responses(
        (status = 200, description = "Hospital records", body = HospitalsRes)
    )
)]
#[axum::debug_handler]
async fn list_hospitals(State(state): State<AppState>) -> Json<HospitalsRes> {
    Json(HospitalsRes {
        hospitals: state
            .store
            .snapshot()
            .hospitals
            .into_iter()
            .map(Into::into)
            .collect(),
    })
}
