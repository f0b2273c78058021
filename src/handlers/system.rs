// src/handlers/system.rs

use axum::http::StatusCode;
use serde_json::json;
use utoipa::OpenApi;

use crate::{
    common::error::AppError,
    docs::ApiDoc,
    handlers::{HandlerResult, Reply, RequestCtx},
    models::auth::UserProfile,
};

// GET /health
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses((status = 200, description = "Serviço no ar"))
)]
pub async fn health(ctx: &RequestCtx<'_>) -> HandlerResult {
    Ok(Reply::ok(json!({
        "status": "ok",
        "service": ctx.state.config.service_name,
    })))
}

// GET /ready
#[utoipa::path(
    get,
    path = "/ready",
    tag = "System",
    responses(
        (status = 200, description = "Pronto para receber tráfego"),
        (status = 503, description = "Ainda não está pronto")
    )
)]
pub async fn ready(ctx: &RequestCtx<'_>) -> HandlerResult {
    if ctx.state.config.app_ready {
        Ok(Reply::ok(json!({ "status": "ready" })))
    } else {
        Ok(Reply::with_status(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "status": "not_ready" }),
        ))
    }
}

// GET /me
#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    responses((status = 200, description = "Usuário autenticado", body = UserProfile)),
    security(("api_jwt" = []))
)]
pub async fn me(ctx: &RequestCtx<'_>) -> HandlerResult {
    let user = ctx.user.ok_or(AppError::MissingToken)?;
    Ok(Reply::ok(json!({ "item": user.profile() })))
}

// GET /admin/ping
#[utoipa::path(
    get,
    path = "/admin/ping",
    tag = "System",
    responses(
        (status = 200, description = "Acesso administrativo confirmado"),
        (status = 403, description = "Sem a permissão users.manage")
    ),
    security(("api_jwt" = []))
)]
pub async fn admin_ping(_ctx: &RequestCtx<'_>) -> HandlerResult {
    Ok(Reply::ok(json!({ "status": "ok", "scope": "admin" })))
}

// GET /openapi.json
pub async fn openapi(_ctx: &RequestCtx<'_>) -> HandlerResult {
    let doc = serde_json::to_value(ApiDoc::openapi())
        .map_err(|e| anyhow::anyhow!("Falha ao serializar OpenAPI: {}", e))?;
    Ok(Reply::ok(doc))
}
