// src/handlers/visits.rs

use serde_json::json;

use crate::{
    handlers::{HandlerResult, Reply, RequestCtx},
    models::visit::{CompleteVisitPayload, Visit, VisitFilter, VisitPayload, VisitStatus},
};

// GET /visits
#[utoipa::path(
    get,
    path = "/visits",
    tag = "Visits",
    params(("status" = Option<String>, Query, description = "pendente, concluida ou cancelada")),
    responses(
        (status = 200, description = "Visitas agendadas", body = [Visit]),
        (status = 422, description = "Status inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list(ctx: &RequestCtx<'_>) -> HandlerResult {
    let filter: VisitFilter = ctx.parse()?;
    let status = filter
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<VisitStatus>)
        .transpose()?;

    let items = ctx.state.visit_repo.list(status).await;
    Ok(Reply::ok(json!({ "items": items })))
}

// POST /visits
#[utoipa::path(
    post,
    path = "/visits",
    tag = "Visits",
    request_body = VisitPayload,
    responses(
        (status = 201, description = "Visita agendada", body = Visit),
        (status = 422, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: VisitPayload = ctx.parse()?;
    let visit = ctx.state.visit_repo.create(payload).await?;
    ctx.audit("visit.create", json!({ "visit_id": visit.id })).await;

    Ok(Reply::created(json!({ "item": visit })))
}

// POST /visits/{id}/complete
#[utoipa::path(
    post,
    path = "/visits/{id}/complete",
    tag = "Visits",
    request_body = CompleteVisitPayload,
    params(("id" = u64, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita concluída", body = Visit),
        (status = 404, description = "Visita não encontrada"),
        (status = 422, description = "Visita não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete(ctx: &RequestCtx<'_>) -> HandlerResult {
    let id = ctx.path_id()?;
    let payload: CompleteVisitPayload = ctx.parse()?;
    let completed_at = payload.completed_at.unwrap_or_else(|| ctx.now());

    let visit = ctx.state.visit_repo.complete(id, completed_at).await?;
    ctx.audit("visit.complete", json!({ "visit_id": visit.id })).await;

    Ok(Reply::ok(json!({ "item": visit })))
}

// POST /visits/{id}/cancel
#[utoipa::path(
    post,
    path = "/visits/{id}/cancel",
    tag = "Visits",
    params(("id" = u64, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita cancelada", body = Visit),
        (status = 404, description = "Visita não encontrada"),
        (status = 422, description = "Visita não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel(ctx: &RequestCtx<'_>) -> HandlerResult {
    let id = ctx.path_id()?;
    let visit = ctx.state.visit_repo.cancel(id).await?;
    ctx.audit("visit.cancel", json!({ "visit_id": visit.id })).await;

    Ok(Reply::ok(json!({ "item": visit })))
}
