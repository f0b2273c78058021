// src/kernel.rs

use axum::http::{HeaderMap, Method, StatusCode};
use serde_json::{json, Value};

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{
        self, auth, deliveries, eligibility, equipment, families, reports, settings, street,
        system, visits, HandlerResult, Reply, RequestCtx,
    },
    middleware::{
        self as mw,
        rbac::{self, Access},
    },
    models::auth::User,
    routes::{self, Route, RouteId, RouteMatch},
    services::export::ExportFormat,
};

static NULL: Value = Value::Null;

#[derive(Debug)]
pub enum ResponseBody {
    Json(Value),
    Binary {
        content_type: &'static str,
        filename: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug)]
pub struct KernelResponse {
    pub status: StatusCode,
    pub request_id: String,
    pub body: ResponseBody,
}

impl KernelResponse {
    /// Corpo JSON (para exportações binárias devolve `Value::Null`).
    pub fn json(&self) -> &Value {
        match &self.body {
            ResponseBody::Json(value) => value,
            ResponseBody::Binary { .. } => &NULL,
        }
    }
}

/// Despacho puro: método + caminho + cabeçalhos + payload -> resposta.
#[derive(Clone)]
pub struct Kernel {
    state: AppState,
}

impl Kernel {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn handle(
        &self,
        method: &Method,
        path: &str,
        request_id: &str,
        headers: &HeaderMap,
        payload: &Value,
    ) -> KernelResponse {
        let (status, body) = match self.dispatch(method, path, request_id, headers, payload).await {
            Ok(Reply::Json { status, mut body }) => {
                if let Value::Object(map) = &mut body {
                    map.insert("request_id".to_string(), json!(request_id));
                }
                (status, ResponseBody::Json(body))
            }
            Ok(Reply::File(file)) => (
                StatusCode::OK,
                ResponseBody::Binary {
                    content_type: file.content_type,
                    filename: file.filename,
                    bytes: file.bytes,
                },
            ),
            Err(err) => (err.status(), ResponseBody::Json(err.to_body(request_id))),
        };

        KernelResponse {
            status,
            request_id: request_id.to_string(),
            body,
        }
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        request_id: &str,
        headers: &HeaderMap,
        payload: &Value,
    ) -> HandlerResult {
        let (route, id) = match routes::resolve(method, path) {
            RouteMatch::Found { route, id } => (route, id),
            RouteMatch::MethodNotAllowed => return Err(AppError::MethodNotAllowed),
            RouteMatch::NotFound => return Err(AppError::RouteNotFound),
        };

        let user = self.guard(route, request_id, headers).await?;
        let ctx = RequestCtx {
            state: &self.state,
            request_id,
            headers,
            user: user.as_ref(),
            id,
            payload,
        };

        run(route.id, &ctx).await
    }

    // Autenticação e autorização conforme o `Access` da rota.
    async fn guard(
        &self,
        route: &Route,
        request_id: &str,
        headers: &HeaderMap,
    ) -> Result<Option<User>, AppError> {
        let policy = match route.access {
            Access::Public => return Ok(None),
            Access::Authenticated => {
                return mw::auth::authenticate(&self.state, headers).await.map(Some);
            }
            Access::Policy(policy) => policy,
        };

        let user = mw::auth::authenticate(&self.state, headers).await?;
        if let Err(err) = rbac::authorize(policy, &user) {
            tracing::warn!(
                request_id,
                user_id = user.id,
                route = route.pattern,
                "Acesso negado"
            );
            self.state
                .audit
                .record(
                    request_id,
                    Some(user.id),
                    "auth.forbidden",
                    json!({ "route": route.pattern, "policy": format!("{policy:?}") }),
                )
                .await;
            return Err(err);
        }
        Ok(Some(user))
    }
}

async fn run(route: RouteId, ctx: &RequestCtx<'_>) -> handlers::HandlerResult {
    match route {
        RouteId::Health => system::health(ctx).await,
        RouteId::Ready => system::ready(ctx).await,
        RouteId::OpenApi => system::openapi(ctx).await,
        RouteId::Me => system::me(ctx).await,
        RouteId::AdminPing => system::admin_ping(ctx).await,

        RouteId::Login => auth::login(ctx).await,
        RouteId::Logout => auth::logout(ctx).await,
        RouteId::Forgot => auth::forgot(ctx).await,
        RouteId::Reset => auth::reset(ctx).await,

        RouteId::ListFamilies => families::list_families(ctx).await,
        RouteId::GetFamily => families::get_family(ctx).await,
        RouteId::CreateFamily => families::create_family(ctx).await,
        RouteId::UpdateFamily => families::update_family(ctx).await,
        RouteId::DeleteFamily => families::delete_family(ctx).await,
        RouteId::ListDependents => families::list_dependents(ctx).await,
        RouteId::CreateDependent => families::create_dependent(ctx).await,
        RouteId::DeleteDependent => families::delete_dependent(ctx).await,
        RouteId::ListChildren => families::list_children(ctx).await,
        RouteId::CreateChild => families::create_child(ctx).await,
        RouteId::DeleteChild => families::delete_child(ctx).await,

        RouteId::ListStreetPeople => street::list_people(ctx).await,
        RouteId::CreateStreetPerson => street::create_person(ctx).await,
        RouteId::CreateReferral => street::create_referral(ctx).await,
        RouteId::UpdateReferralStatus => street::update_referral_status(ctx).await,

        RouteId::ListEvents => deliveries::list_events(ctx).await,
        RouteId::CreateEvent => deliveries::create_event(ctx).await,
        RouteId::InviteFamily => deliveries::invite_family(ctx).await,
        RouteId::PublishEvent => deliveries::publish_event(ctx).await,
        RouteId::RegisterWithdrawal => deliveries::register_withdrawal(ctx).await,

        RouteId::ListEquipment => equipment::list_equipment(ctx).await,
        RouteId::CreateEquipment => equipment::create_equipment(ctx).await,
        RouteId::UpdateEquipment => equipment::update_equipment(ctx).await,
        RouteId::ListLoans => equipment::list_loans(ctx).await,
        RouteId::CreateLoan => equipment::create_loan(ctx).await,
        RouteId::ReturnLoan => equipment::return_loan(ctx).await,

        RouteId::ReportSummary => reports::summary(ctx).await,
        RouteId::ReportExport(ExportFormat::Csv) => reports::export_csv(ctx).await,
        RouteId::ReportExport(ExportFormat::Xlsx) => reports::export_xlsx(ctx).await,
        RouteId::ReportExport(ExportFormat::Pdf) => reports::export_pdf(ctx).await,
        RouteId::MonthlyReport => reports::monthly(ctx).await,
        RouteId::MonthlyExport(ExportFormat::Csv) => reports::monthly_export_csv(ctx).await,
        RouteId::MonthlyExport(ExportFormat::Xlsx) => reports::monthly_export_xlsx(ctx).await,
        RouteId::MonthlyExport(ExportFormat::Pdf) => reports::monthly_export_pdf(ctx).await,

        RouteId::GetEligibilitySettings => settings::get_eligibility(ctx).await,
        RouteId::UpdateEligibilitySettings => settings::update_eligibility(ctx).await,
        RouteId::CheckEligibility => eligibility::check(ctx).await,

        RouteId::ListVisits => visits::list(ctx).await,
        RouteId::CreateVisit => visits::create(ctx).await,
        RouteId::CompleteVisit => visits::complete(ctx).await,
        RouteId::CancelVisit => visits::cancel(ctx).await,
    }
}
