use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::dataset::{BoundingBox, Dataset, ListingQuery};

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub limit: usize,
}

/// Raw query string. Bounds arrive as stringified floats.
#[derive(Debug, Default, Deserialize)]
pub struct PropertiesParams {
    north: Option<String>,
    south: Option<String>,
    east: Option<String>,
    west: Option<String>,
    city: Option<String>,
    district: Option<String>,
    neighborhood: Option<String>,
}

impl PropertiesParams {
    fn into_query(self) -> Result<ListingQuery, String> {
        let bbox = match (self.north, self.south, self.east, self.west) {
            (Some(n), Some(s), Some(e), Some(w)) => Some(BoundingBox {
                north: parse_bound("north", &n)?,
                south: parse_bound("south", &s)?,
                east: parse_bound("east", &e)?,
                west: parse_bound("west", &w)?,
            }),
            _ => None,
        };
        let given = |v: Option<String>| v.filter(|s| !s.is_empty());
        Ok(ListingQuery {
            bbox,
            city: given(self.city),
            district: given(self.district),
            neighborhood: given(self.neighborhood),
        })
    }
}

fn parse_bound(name: &str, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid bound `{name}`: {raw}"))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/properties",
            get(list_properties).fallback(method_not_allowed),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

async fn list_properties(
    State(state): State<AppState>,
    Query(params): Query<PropertiesParams>,
) -> Response {
    let query = match params.into_query() {
        Ok(q) => q,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response();
        }
    };
    let rows = state.dataset.query(&query, state.limit);
    debug!(count = rows.len(), bbox = query.bbox.is_some(), "listing query");
    (StatusCode::OK, Json(rows)).into_response()
}
