// src/handlers/families.rs

use serde_json::json;

use crate::{
    common::{cpf, error::AppError},
    handlers::{HandlerResult, Reply, RequestCtx},
    models::social::{
        Child, ChildPayload, Dependent, DependentPayload, Family, FamilyFilter, FamilyPayload,
    },
};

// Normaliza e valida o CPF antes de chegar ao repositório.
fn checked_cpf(raw: &str) -> Result<String, AppError> {
    if !cpf::is_valid(raw) {
        return Err(AppError::InvalidCpf);
    }
    Ok(cpf::normalize(raw))
}

// =============================================================================
//  ÁREA 1: FAMÍLIAS
// =============================================================================

// GET /families
#[utoipa::path(
    get,
    path = "/families",
    tag = "Families",
    responses((status = 200, description = "Lista de famílias", body = [Family])),
    security(("api_jwt" = []))
)]
pub async fn list_families(ctx: &RequestCtx<'_>) -> HandlerResult {
    let items = ctx.state.social_repo.list_families().await;
    Ok(Reply::ok(json!({ "items": items })))
}

// GET /families/{id}
#[utoipa::path(
    get,
    path = "/families/{id}",
    tag = "Families",
    params(("id" = u64, Path, description = "ID da família")),
    responses(
        (status = 200, description = "Família com dependentes e crianças"),
        (status = 404, description = "Família não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_family(ctx: &RequestCtx<'_>) -> HandlerResult {
    let id = ctx.path_id()?;
    let repo = &ctx.state.social_repo;

    let family = repo.get_family(id).await?;
    let dependents = repo.list_dependents(Some(id)).await;
    let children = repo.list_children(Some(id)).await;

    Ok(Reply::ok(json!({
        "item": family,
        "dependents": dependents,
        "children": children,
    })))
}

// POST /families
#[utoipa::path(
    post,
    path = "/families",
    tag = "Families",
    request_body = FamilyPayload,
    responses(
        (status = 201, description = "Família criada", body = Family),
        (status = 409, description = "CPF já cadastrado"),
        (status = 422, description = "Dados ou CPF inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_family(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: FamilyPayload = ctx.parse()?;
    let cpf = checked_cpf(&payload.responsible_cpf)?;

    let family = ctx.state.social_repo.create_family(payload, cpf).await?;
    ctx.audit("family.create", json!({ "family_id": family.id })).await;

    Ok(Reply::created(json!({ "item": family })))
}

// PUT /families/{id}
#[utoipa::path(
    put,
    path = "/families/{id}",
    tag = "Families",
    request_body = FamilyPayload,
    params(("id" = u64, Path, description = "ID da família")),
    responses(
        (status = 200, description = "Família atualizada", body = Family),
        (status = 404, description = "Família não encontrada"),
        (status = 409, description = "CPF já cadastrado em outra família")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_family(ctx: &RequestCtx<'_>) -> HandlerResult {
    let id = ctx.path_id()?;
    let payload: FamilyPayload = ctx.parse()?;
    let cpf = checked_cpf(&payload.responsible_cpf)?;

    let family = ctx.state.social_repo.update_family(id, payload, cpf).await?;
    ctx.audit("family.update", json!({ "family_id": family.id })).await;

    Ok(Reply::ok(json!({ "item": family })))
}

// DELETE /families/{id}
#[utoipa::path(
    delete,
    path = "/families/{id}",
    tag = "Families",
    params(("id" = u64, Path, description = "ID da família")),
    responses(
        (status = 200, description = "Família removida (com dependentes e crianças)"),
        (status = 404, description = "Família não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_family(ctx: &RequestCtx<'_>) -> HandlerResult {
    let id = ctx.path_id()?;
    ctx.state.social_repo.delete_family(id).await?;
    ctx.audit("family.delete", json!({ "family_id": id })).await;

    Ok(Reply::ok(json!({ "deleted": true, "id": id })))
}

// =============================================================================
//  ÁREA 2: DEPENDENTES
// =============================================================================

// GET /dependents
#[utoipa::path(
    get,
    path = "/dependents",
    tag = "Families",
    params(("family_id" = Option<u64>, Query, description = "Filtra por família")),
    responses((status = 200, description = "Lista de dependentes", body = [Dependent])),
    security(("api_jwt" = []))
)]
pub async fn list_dependents(ctx: &RequestCtx<'_>) -> HandlerResult {
    let filter: FamilyFilter = ctx.parse()?;
    let items = ctx.state.social_repo.list_dependents(filter.family_id).await;
    Ok(Reply::ok(json!({ "items": items })))
}

// POST /dependents
#[utoipa::path(
    post,
    path = "/dependents",
    tag = "Families",
    request_body = DependentPayload,
    responses(
        (status = 201, description = "Dependente criado", body = Dependent),
        (status = 404, description = "Família não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_dependent(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: DependentPayload = ctx.parse()?;
    let dependent = ctx.state.social_repo.create_dependent(payload).await?;
    ctx.audit(
        "dependent.create",
        json!({ "dependent_id": dependent.id, "family_id": dependent.family_id }),
    )
    .await;

    Ok(Reply::created(json!({ "item": dependent })))
}

// DELETE /dependents/{id}
#[utoipa::path(
    delete,
    path = "/dependents/{id}",
    tag = "Families",
    params(("id" = u64, Path, description = "ID do dependente")),
    responses(
        (status = 200, description = "Dependente removido"),
        (status = 404, description = "Dependente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_dependent(ctx: &RequestCtx<'_>) -> HandlerResult {
    let id = ctx.path_id()?;
    ctx.state.social_repo.delete_dependent(id).await?;
    ctx.audit("dependent.delete", json!({ "dependent_id": id })).await;

    Ok(Reply::ok(json!({ "deleted": true, "id": id })))
}

// =============================================================================
//  ÁREA 3: CRIANÇAS
// =============================================================================

// GET /children
#[utoipa::path(
    get,
    path = "/children",
    tag = "Families",
    params(("family_id" = Option<u64>, Query, description = "Filtra por família")),
    responses((status = 200, description = "Lista de crianças", body = [Child])),
    security(("api_jwt" = []))
)]
pub async fn list_children(ctx: &RequestCtx<'_>) -> HandlerResult {
    let filter: FamilyFilter = ctx.parse()?;
    let items = ctx.state.social_repo.list_children(filter.family_id).await;
    Ok(Reply::ok(json!({ "items": items })))
}

// POST /children
#[utoipa::path(
    post,
    path = "/children",
    tag = "Families",
    request_body = ChildPayload,
    responses(
        (status = 201, description = "Criança cadastrada", body = Child),
        (status = 404, description = "Família não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_child(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: ChildPayload = ctx.parse()?;
    let child = ctx.state.social_repo.create_child(payload).await?;
    ctx.audit(
        "child.create",
        json!({ "child_id": child.id, "family_id": child.family_id }),
    )
    .await;

    Ok(Reply::created(json!({ "item": child })))
}

// DELETE /children/{id}
#[utoipa::path(
    delete,
    path = "/children/{id}",
    tag = "Families",
    params(("id" = u64, Path, description = "ID da criança")),
    responses(
        (status = 200, description = "Criança removida"),
        (status = 404, description = "Criança não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_child(ctx: &RequestCtx<'_>) -> HandlerResult {
    let id = ctx.path_id()?;
    ctx.state.social_repo.delete_child(id).await?;
    ctx.audit("child.delete", json!({ "child_id": id })).await;

    Ok(Reply::ok(json!({ "deleted": true, "id": id })))
}
