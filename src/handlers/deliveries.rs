// src/handlers/deliveries.rs

use serde_json::json;

use crate::{
    handlers::{HandlerResult, Reply, RequestCtx},
    models::delivery::{
        DeliveryEvent, DeliveryEventPayload, DeliveryInvite, DeliveryWithdrawal, InvitePayload,
        PublishPayload, WithdrawalPayload,
    },
};

// GET /deliveries/events
#[utoipa::path(
    get,
    path = "/deliveries/events",
    tag = "Deliveries",
    responses((status = 200, description = "Eventos de entrega", body = [DeliveryEvent])),
    security(("api_jwt" = []))
)]
pub async fn list_events(ctx: &RequestCtx<'_>) -> HandlerResult {
    let items = ctx.state.delivery_repo.list_events().await;
    Ok(Reply::ok(json!({ "items": items })))
}

// POST /deliveries/events
#[utoipa::path(
    post,
    path = "/deliveries/events",
    tag = "Deliveries",
    request_body = DeliveryEventPayload,
    responses(
        (status = 201, description = "Evento criado", body = DeliveryEvent),
        (status = 422, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_event(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: DeliveryEventPayload = ctx.parse()?;
    let event = ctx.state.delivery_repo.create_event(payload).await?;
    ctx.audit("delivery_event.create", json!({ "event_id": event.id }))
        .await;

    Ok(Reply::created(json!({ "item": event })))
}

// POST /deliveries/events/{id}/invites
#[utoipa::path(
    post,
    path = "/deliveries/events/{id}/invites",
    tag = "Deliveries",
    request_body = InvitePayload,
    params(("id" = u64, Path, description = "ID do evento")),
    responses(
        (status = 201, description = "Família convidada", body = DeliveryInvite),
        (status = 200, description = "Família já estava convidada", body = DeliveryInvite),
        (status = 404, description = "Evento ou família não encontrados"),
        (status = 409, description = "Evento já publicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn invite_family(ctx: &RequestCtx<'_>) -> HandlerResult {
    let event_id = ctx.path_id()?;
    let payload: InvitePayload = ctx.parse()?;

    ctx.state.delivery_repo.get_event(event_id).await?;

    let outcome = ctx
        .state
        .social_repo
        .with_family(
            payload.family_id,
            ctx.state.delivery_repo.invite_family(event_id, payload.family_id),
        )
        .await?;

    if !outcome.changed {
        return Ok(Reply::ok(json!({ "item": outcome.item })));
    }

    ctx.audit(
        "delivery_invite.create",
        json!({
            "event_id": event_id,
            "family_id": outcome.item.family_id,
            "invite_id": outcome.item.id,
        }),
    )
    .await;
    Ok(Reply::created(json!({ "item": outcome.item })))
}

// POST /deliveries/events/{id}/publish
#[utoipa::path(
    post,
    path = "/deliveries/events/{id}/publish",
    tag = "Deliveries",
    request_body = PublishPayload,
    params(("id" = u64, Path, description = "ID do evento")),
    responses(
        (status = 200, description = "Evento publicado", body = DeliveryEvent),
        (status = 404, description = "Evento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn publish_event(ctx: &RequestCtx<'_>) -> HandlerResult {
    let event_id = ctx.path_id()?;
    let payload: PublishPayload = ctx.parse()?;
    let published_at = payload.published_at.unwrap_or_else(|| ctx.now());

    let outcome = ctx
        .state
        .delivery_repo
        .publish_event(event_id, published_at)
        .await?;

    if outcome.changed {
        ctx.audit("delivery_event.publish", json!({ "event_id": event_id }))
            .await;
    }
    Ok(Reply::ok(json!({ "item": outcome.item })))
}

// POST /deliveries/events/{id}/withdrawals
#[utoipa::path(
    post,
    path = "/deliveries/events/{id}/withdrawals",
    tag = "Deliveries",
    request_body = WithdrawalPayload,
    params(("id" = u64, Path, description = "ID do evento")),
    responses(
        (status = 201, description = "Retirada registrada", body = DeliveryWithdrawal),
        (status = 404, description = "Evento ou família não encontrados"),
        (status = 409, description = "Família já retirou neste mês"),
        (status = 422, description = "Assinatura obrigatória")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_withdrawal(ctx: &RequestCtx<'_>) -> HandlerResult {
    let event_id = ctx.path_id()?;
    let payload: WithdrawalPayload = ctx.parse()?;

    ctx.state.delivery_repo.get_event(event_id).await?;

    let family_id = payload.family_id;
    let withdrawal = ctx
        .state
        .social_repo
        .with_family(
            family_id,
            ctx.state
                .delivery_repo
                .register_withdrawal(event_id, payload, ctx.now()),
        )
        .await?;
    ctx.audit(
        "delivery_withdrawal.create",
        json!({
            "event_id": event_id,
            "family_id": withdrawal.family_id,
            "withdrawal_id": withdrawal.id,
        }),
    )
    .await;

    Ok(Reply::created(json!({ "item": withdrawal })))
}
