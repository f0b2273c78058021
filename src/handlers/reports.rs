// src/handlers/reports.rs

use serde_json::json;

use crate::{
    common::error::AppError,
    handlers::{HandlerResult, Reply, RequestCtx},
    models::{
        reports::{MonthlyQuery, MonthlyReport, ReportSummary},
        visit::VisitStatus,
    },
    services::{
        export::{self, ExportFormat, ExportTable},
        report_service::{self, Period},
    },
};

// GET /reports/summary
#[utoipa::path(
    get,
    path = "/reports/summary",
    tag = "Reports",
    responses((status = 200, description = "Totais gerais", body = ReportSummary)),
    security(("api_jwt" = []))
)]
pub async fn summary(ctx: &RequestCtx<'_>) -> HandlerResult {
    let summary = report_service::summary(ctx.state).await;
    Ok(Reply::ok(json!(summary)))
}

async fn export_families(ctx: &RequestCtx<'_>, format: ExportFormat) -> HandlerResult {
    let families = ctx.state.social_repo.list_families().await;
    let file = export::render(
        format,
        &ExportTable::families(&families),
        "families",
        &ctx.state.pdf_fonts,
    )?;
    Ok(Reply::File(file))
}

// GET /reports/export.csv
#[utoipa::path(
    get,
    path = "/reports/export.csv",
    tag = "Reports",
    responses((status = 200, description = "Famílias em CSV", content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn export_csv(ctx: &RequestCtx<'_>) -> HandlerResult {
    export_families(ctx, ExportFormat::Csv).await
}

// GET /reports/export.xlsx
#[utoipa::path(
    get,
    path = "/reports/export.xlsx",
    tag = "Reports",
    responses((
        status = 200,
        description = "Famílias em planilha",
        content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    )),
    security(("api_jwt" = []))
)]
pub async fn export_xlsx(ctx: &RequestCtx<'_>) -> HandlerResult {
    export_families(ctx, ExportFormat::Xlsx).await
}

// GET /reports/export.pdf
#[utoipa::path(
    get,
    path = "/reports/export.pdf",
    tag = "Reports",
    responses((status = 200, description = "Famílias em PDF", content_type = "application/pdf")),
    security(("api_jwt" = []))
)]
pub async fn export_pdf(ctx: &RequestCtx<'_>) -> HandlerResult {
    export_families(ctx, ExportFormat::Pdf).await
}

async fn monthly_report(ctx: &RequestCtx<'_>) -> Result<MonthlyReport, AppError> {
    let query: MonthlyQuery = ctx.parse()?;
    let today = ctx.state.clock.now().date_naive();

    let period = Period::parse(query.period.as_deref(), today)?;
    let visit_status = query
        .visit_status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<VisitStatus>)
        .transpose()?;

    Ok(report_service::monthly(ctx.state, period, visit_status).await)
}

// GET /reports/monthly
#[utoipa::path(
    get,
    path = "/reports/monthly",
    tag = "Reports",
    params(
        ("period" = Option<String>, Query, description = "Mês no formato YYYY-MM"),
        ("visit_status" = Option<String>, Query, description = "pendente, concluida ou cancelada")
    ),
    responses(
        (status = 200, description = "Relatório mensal", body = MonthlyReport),
        (status = 422, description = "Período ou status inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly(ctx: &RequestCtx<'_>) -> HandlerResult {
    let report = monthly_report(ctx).await?;
    Ok(Reply::ok(json!(report)))
}

async fn export_monthly(ctx: &RequestCtx<'_>, format: ExportFormat) -> HandlerResult {
    let report = monthly_report(ctx).await?;
    let basename = format!("monthly-{}", report.period);
    let file = export::render(
        format,
        &ExportTable::monthly(&report),
        &basename,
        &ctx.state.pdf_fonts,
    )?;
    Ok(Reply::File(file))
}

// GET /reports/monthly/export.csv
#[utoipa::path(
    get,
    path = "/reports/monthly/export.csv",
    tag = "Reports",
    params(("period" = Option<String>, Query, description = "Mês no formato YYYY-MM")),
    responses((status = 200, description = "Métricas do mês em CSV", content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn monthly_export_csv(ctx: &RequestCtx<'_>) -> HandlerResult {
    export_monthly(ctx, ExportFormat::Csv).await
}

// GET /reports/monthly/export.xlsx
#[utoipa::path(
    get,
    path = "/reports/monthly/export.xlsx",
    tag = "Reports",
    params(("period" = Option<String>, Query, description = "Mês no formato YYYY-MM")),
    responses((
        status = 200,
        description = "Métricas do mês em planilha",
        content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    )),
    security(("api_jwt" = []))
)]
pub async fn monthly_export_xlsx(ctx: &RequestCtx<'_>) -> HandlerResult {
    export_monthly(ctx, ExportFormat::Xlsx).await
}

// GET /reports/monthly/export.pdf
#[utoipa::path(
    get,
    path = "/reports/monthly/export.pdf",
    tag = "Reports",
    params(("period" = Option<String>, Query, description = "Mês no formato YYYY-MM")),
    responses((status = 200, description = "Métricas do mês em PDF", content_type = "application/pdf")),
    security(("api_jwt" = []))
)]
pub async fn monthly_export_pdf(ctx: &RequestCtx<'_>) -> HandlerResult {
    export_monthly(ctx, ExportFormat::Pdf).await
}
