// src/server.rs

use std::{collections::HashMap, sync::Arc, time::Instant};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, Method, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::{
    config::{AppState, Config},
    kernel::{Kernel, KernelResponse, ResponseBody},
    middleware::request_id::{self, REQUEST_ID_HEADER},
};

/// Toda requisição cai no fallback e é resolvida pela tabela do kernel.
pub fn router(kernel: Kernel) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(Arc::new(kernel))
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr.clone();
    let state = AppState::new(config)
        .await
        .context("Falha ao inicializar o estado da aplicação")?;
    let app = router(Kernel::new(state));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao abrir o listener TCP em {addr}"))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Erro no servidor Axum")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao escutar o sinal de desligamento: {}", e);
    }
    tracing::info!("Desligando...");
}

// GET/DELETE leem a query string; os demais, o corpo JSON.
fn request_payload(method: &Method, uri: &Uri, body: &Bytes) -> Value {
    if *method == Method::GET || *method == Method::DELETE {
        return match Query::<HashMap<String, String>>::try_from_uri(uri) {
            Ok(Query(params)) => Value::Object(
                params
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            ),
            Err(_) => Value::Null,
        };
    }

    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

async fn dispatch(
    State(kernel): State<Arc<Kernel>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    let request_id = request_id::resolve(&headers);
    let payload = request_payload(&method, &uri, &body);

    let outcome = kernel
        .handle(&method, uri.path(), &request_id, &headers, &payload)
        .await;
    let status = outcome.status;

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
        status = status.as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "http_request"
    );

    into_response(outcome)
}

fn into_response(outcome: KernelResponse) -> Response {
    let mut response = match outcome.body {
        ResponseBody::Json(body) => (outcome.status, Json(body)).into_response(),
        ResponseBody::Binary {
            content_type,
            filename,
            bytes,
        } => (
            outcome.status,
            [
                (header::CONTENT_TYPE, content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
    };

    if let Ok(value) = HeaderValue::from_str(&outcome.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_payload_comes_from_query_string() {
        let uri: Uri = "/reports/monthly?period=2024-03&visit_status=pendente"
            .parse()
            .unwrap();
        let payload = request_payload(&Method::GET, &uri, &Bytes::new());
        assert_eq!(payload["period"], "2024-03");
        assert_eq!(payload["visit_status"], "pendente");
    }

    #[test]
    fn post_payload_comes_from_body() {
        let uri: Uri = "/families?ignored=1".parse().unwrap();
        let body = Bytes::from_static(br#"{"responsible_full_name":"Ana"}"#);
        let payload = request_payload(&Method::POST, &uri, &body);
        assert_eq!(payload["responsible_full_name"], "Ana");
        assert!(payload.get("ignored").is_none());
    }

    #[test]
    fn empty_or_broken_body_is_null() {
        let uri: Uri = "/families".parse().unwrap();
        assert_eq!(request_payload(&Method::POST, &uri, &Bytes::new()), Value::Null);
        assert_eq!(
            request_payload(&Method::PUT, &uri, &Bytes::from_static(b"{oops")),
            Value::Null
        );
    }
}
