// src/middleware/request_id.rs

use axum::http::HeaderMap;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_LEN: usize = 128;

/// Reaproveita o `X-Request-Id` do cliente ou gera um novo.
pub fn resolve(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_LEN)
        .map(String::from)
        .unwrap_or_else(generate)
}

pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()
}
