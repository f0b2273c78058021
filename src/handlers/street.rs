// src/handlers/street.rs

use serde_json::json;

use crate::{
    handlers::{HandlerResult, Reply, RequestCtx},
    models::street::{
        Referral, ReferralPayload, ReferralStatusPayload, StreetPerson, StreetPersonPayload,
    },
};

// GET /street/people
#[utoipa::path(
    get,
    path = "/street/people",
    tag = "Street",
    responses((status = 200, description = "Pessoas em situação de rua", body = [StreetPerson])),
    security(("api_jwt" = []))
)]
pub async fn list_people(ctx: &RequestCtx<'_>) -> HandlerResult {
    let items = ctx.state.street_repo.list_people().await;
    Ok(Reply::ok(json!({ "items": items })))
}

// POST /street/people
#[utoipa::path(
    post,
    path = "/street/people",
    tag = "Street",
    request_body = StreetPersonPayload,
    responses(
        (status = 201, description = "Atendimento registrado", body = StreetPerson),
        (status = 422, description = "Atendimento concluído sem consentimento LGPD")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_person(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: StreetPersonPayload = ctx.parse()?;
    let person = ctx.state.street_repo.create_person(payload).await?;
    ctx.audit("street_person.create", json!({ "person_id": person.id }))
        .await;

    Ok(Reply::created(json!({ "item": person })))
}

// POST /street/referrals
#[utoipa::path(
    post,
    path = "/street/referrals",
    tag = "Street",
    request_body = ReferralPayload,
    responses(
        (status = 201, description = "Encaminhamento criado", body = Referral),
        (status = 404, description = "Pessoa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_referral(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: ReferralPayload = ctx.parse()?;
    let referral = ctx.state.street_repo.create_referral(payload).await?;
    ctx.audit(
        "referral.create",
        json!({ "referral_id": referral.id, "person_id": referral.person_id }),
    )
    .await;

    Ok(Reply::created(json!({ "item": referral })))
}

// POST /street/referrals/{id}/status
#[utoipa::path(
    post,
    path = "/street/referrals/{id}/status",
    tag = "Street",
    request_body = ReferralStatusPayload,
    params(("id" = u64, Path, description = "ID do encaminhamento")),
    responses(
        (status = 200, description = "Status atualizado", body = Referral),
        (status = 404, description = "Encaminhamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_referral_status(ctx: &RequestCtx<'_>) -> HandlerResult {
    let id = ctx.path_id()?;
    let payload: ReferralStatusPayload = ctx.parse()?;

    let referral = ctx
        .state
        .street_repo
        .update_referral_status(id, payload.status)
        .await?;
    ctx.audit("referral.update_status", json!({ "referral_id": referral.id }))
        .await;

    Ok(Reply::ok(json!({ "item": referral })))
}
