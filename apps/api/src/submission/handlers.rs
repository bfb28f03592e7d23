use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;
use crate::submission::payload::from_payload;
use crate::submission::stats::{read_stats, StatsSnapshot};

/// First `X-Forwarded-For` entry, else the socket peer, lowercased. Empty when
/// neither is known.
pub fn client_origin(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(first), _) => first.to_lowercase(),
        (None, Some(addr)) => addr.ip().to_string().to_lowercase(),
        (None, None) => String::new(),
    }
}

/// POST /api/queue
pub async fn handle_submit(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let origin = client_origin(&headers, peer.map(|ConnectInfo(addr)| addr));
    // Unreadable bodies count as an empty submission and fail field validation.
    let payload: Value = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!(error = %e, "Submission body is not valid JSON");
        Value::Object(Map::new())
    });
    let request = from_payload(&payload);
    let receipt = state.submissions.process(request, &origin).await?;

    let mut response = Json(receipt).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}

/// GET /api/stats
pub async fn handle_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(read_stats(state.submissions.store()).await)
}
