// src/handlers/equipment.rs

use serde_json::json;

use crate::{
    handlers::{HandlerResult, Reply, RequestCtx},
    models::equipment::{
        Equipment, EquipmentChanges, EquipmentLoan, EquipmentPayload, EquipmentStatus,
        EquipmentUpdatePayload, LoanPayload, ReturnPayload,
    },
};

// GET /equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "Equipment",
    responses((status = 200, description = "Equipamentos cadastrados", body = [Equipment])),
    security(("api_jwt" = []))
)]
pub async fn list_equipment(ctx: &RequestCtx<'_>) -> HandlerResult {
    let items = ctx.state.equipment_repo.list_equipment().await;
    Ok(Reply::ok(json!({ "items": items })))
}

// POST /equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "Equipment",
    request_body = EquipmentPayload,
    responses(
        (status = 201, description = "Equipamento criado", body = Equipment),
        (status = 422, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_equipment(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: EquipmentPayload = ctx.parse()?;
    let equipment = ctx.state.equipment_repo.create_equipment(payload).await?;
    ctx.audit("equipment.create", json!({ "equipment_id": equipment.id }))
        .await;

    Ok(Reply::created(json!({ "item": equipment })))
}

// PUT /equipment/{id}
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "Equipment",
    request_body = EquipmentUpdatePayload,
    params(("id" = u64, Path, description = "ID do equipamento")),
    responses(
        (status = 200, description = "Equipamento atualizado", body = Equipment),
        (status = 404, description = "Equipamento não encontrado"),
        (status = 422, description = "Status inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_equipment(ctx: &RequestCtx<'_>) -> HandlerResult {
    let id = ctx.path_id()?;
    let payload: EquipmentUpdatePayload = ctx.parse()?;

    let status = payload
        .status
        .as_deref()
        .map(str::parse::<EquipmentStatus>)
        .transpose()?;
    let changes = EquipmentChanges {
        status,
        condition: payload.condition,
        notes: payload.notes,
    };

    let equipment = ctx.state.equipment_repo.update_equipment(id, changes).await?;
    ctx.audit("equipment.update", json!({ "equipment_id": equipment.id }))
        .await;

    Ok(Reply::ok(json!({ "item": equipment })))
}

// GET /equipment/loans
#[utoipa::path(
    get,
    path = "/equipment/loans",
    tag = "Equipment",
    responses((status = 200, description = "Empréstimos", body = [EquipmentLoan])),
    security(("api_jwt" = []))
)]
pub async fn list_loans(ctx: &RequestCtx<'_>) -> HandlerResult {
    let items = ctx.state.equipment_repo.list_loans().await;
    Ok(Reply::ok(json!({ "items": items })))
}

// POST /equipment/loans
#[utoipa::path(
    post,
    path = "/equipment/loans",
    tag = "Equipment",
    request_body = LoanPayload,
    responses(
        (status = 201, description = "Empréstimo aberto", body = EquipmentLoan),
        (status = 404, description = "Equipamento ou família não encontrados"),
        (status = 409, description = "Equipamento indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_loan(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: LoanPayload = ctx.parse()?;

    let family_id = payload.family_id;
    let loan = ctx
        .state
        .social_repo
        .with_family(
            family_id,
            ctx.state.equipment_repo.create_loan(payload, ctx.now()),
        )
        .await?;
    ctx.audit(
        "equipment_loan.create",
        json!({
            "loan_id": loan.id,
            "equipment_id": loan.equipment_id,
            "family_id": loan.family_id,
        }),
    )
    .await;

    Ok(Reply::created(json!({ "item": loan })))
}

// POST /equipment/loans/{id}/return
#[utoipa::path(
    post,
    path = "/equipment/loans/{id}/return",
    tag = "Equipment",
    request_body = ReturnPayload,
    params(("id" = u64, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Empréstimo devolvido", body = EquipmentLoan),
        (status = 404, description = "Empréstimo não encontrado"),
        (status = 409, description = "Empréstimo já encerrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn return_loan(ctx: &RequestCtx<'_>) -> HandlerResult {
    let id = ctx.path_id()?;
    let payload: ReturnPayload = ctx.parse()?;

    let loan = ctx
        .state
        .equipment_repo
        .return_loan(id, payload, ctx.now())
        .await?;
    ctx.audit(
        "equipment_loan.return",
        json!({ "loan_id": loan.id, "equipment_id": loan.equipment_id }),
    )
    .await;

    Ok(Reply::ok(json!({ "item": loan })))
}
