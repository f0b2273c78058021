// src/handlers/settings.rs

use serde_json::json;

use crate::{
    handlers::{HandlerResult, Reply, RequestCtx},
    models::settings::{EligibilitySettings, EligibilitySettingsPatch},
};

// GET /settings/eligibility
#[utoipa::path(
    get,
    path = "/settings/eligibility",
    tag = "Settings",
    responses((status = 200, description = "Regras de elegibilidade", body = EligibilitySettings)),
    security(("api_jwt" = []))
)]
pub async fn get_eligibility(ctx: &RequestCtx<'_>) -> HandlerResult {
    let settings = ctx.state.settings_repo.get_eligibility().await;
    Ok(Reply::ok(json!({ "item": settings })))
}

// PUT /settings/eligibility
#[utoipa::path(
    put,
    path = "/settings/eligibility",
    tag = "Settings",
    request_body = EligibilitySettingsPatch,
    responses(
        (status = 200, description = "Regras atualizadas", body = EligibilitySettings),
        (status = 422, description = "Valores inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_eligibility(ctx: &RequestCtx<'_>) -> HandlerResult {
    let patch: EligibilitySettingsPatch = ctx.parse()?;
    let settings = ctx.state.settings_repo.update_eligibility(&patch).await?;
    ctx.audit("settings.update", json!({ "section": "eligibility" }))
        .await;

    Ok(Reply::ok(json!({ "item": settings })))
}
