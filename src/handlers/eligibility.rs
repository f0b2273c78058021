// src/handlers/eligibility.rs

use serde_json::json;

use crate::{
    handlers::{HandlerResult, Reply, RequestCtx},
    models::settings::{EligibilityFacts, EligibilityResult},
    services::eligibility,
};

// POST /eligibility/check
#[utoipa::path(
    post,
    path = "/eligibility/check",
    tag = "Eligibility",
    request_body = EligibilityFacts,
    responses((status = 200, description = "Resultado da avaliação", body = EligibilityResult)),
    security(("api_jwt" = []))
)]
pub async fn check(ctx: &RequestCtx<'_>) -> HandlerResult {
    let facts: EligibilityFacts = ctx.parse()?;
    let rules = ctx.state.settings_repo.get_eligibility().await;

    let result = eligibility::evaluate(&facts, &rules);
    Ok(Reply::ok(json!({ "item": result })))
}
