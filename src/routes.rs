// src/routes.rs

use axum::http::Method;

use crate::{
    middleware::rbac::{permissions as perm, Access},
    services::export::ExportFormat,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn matches(self, method: &Method) -> bool {
        match self {
            Verb::Get => *method == Method::GET,
            Verb::Post => *method == Method::POST,
            Verb::Put => *method == Method::PUT,
            Verb::Delete => *method == Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteId {
    Health,
    Ready,
    OpenApi,
    Login,
    Logout,
    Forgot,
    Reset,
    Me,
    AdminPing,
    ListFamilies,
    GetFamily,
    CreateFamily,
    UpdateFamily,
    DeleteFamily,
    ListDependents,
    CreateDependent,
    DeleteDependent,
    ListChildren,
    CreateChild,
    DeleteChild,
    ListStreetPeople,
    CreateStreetPerson,
    CreateReferral,
    UpdateReferralStatus,
    ListEvents,
    CreateEvent,
    InviteFamily,
    PublishEvent,
    RegisterWithdrawal,
    ListEquipment,
    CreateEquipment,
    UpdateEquipment,
    ListLoans,
    CreateLoan,
    ReturnLoan,
    ReportSummary,
    ReportExport(ExportFormat),
    MonthlyReport,
    MonthlyExport(ExportFormat),
    GetEligibilitySettings,
    UpdateEligibilitySettings,
    CheckEligibility,
    ListVisits,
    CreateVisit,
    CompleteVisit,
    CancelVisit,
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub verb: Verb,
    /// Segmentos literais ou `{id}` (apenas dígitos).
    pub pattern: &'static str,
    pub id: RouteId,
    pub access: Access,
}

const fn route(verb: Verb, pattern: &'static str, id: RouteId, access: Access) -> Route {
    Route {
        verb,
        pattern,
        id,
        access,
    }
}

use RouteId as R;
use Verb::{Delete, Get, Post, Put};

const PUBLIC: Access = Access::Public;
const WRITER: Access = Access::writer();

pub static ROUTES: &[Route] = &[
    // Sistema
    route(Get, "/health", R::Health, PUBLIC),
    route(Get, "/ready", R::Ready, PUBLIC),
    route(Get, "/openapi.json", R::OpenApi, PUBLIC),
    route(Get, "/me", R::Me, Access::Authenticated),
    route(Get, "/admin/ping", R::AdminPing, Access::permission(perm::USERS_MANAGE)),
    // Auth
    route(Post, "/auth/login", R::Login, PUBLIC),
    route(Post, "/auth/logout", R::Logout, PUBLIC),
    route(Post, "/auth/forgot", R::Forgot, PUBLIC),
    route(Post, "/auth/reset", R::Reset, PUBLIC),
    // Famílias
    route(Get, "/families", R::ListFamilies, Access::permission(perm::FAMILIES_READ)),
    route(Post, "/families", R::CreateFamily, WRITER),
    route(Get, "/families/{id}", R::GetFamily, Access::permission(perm::FAMILIES_READ)),
    route(Put, "/families/{id}", R::UpdateFamily, WRITER),
    route(Delete, "/families/{id}", R::DeleteFamily, WRITER),
    route(Get, "/dependents", R::ListDependents, Access::permission(perm::FAMILIES_READ)),
    route(Post, "/dependents", R::CreateDependent, WRITER),
    route(Delete, "/dependents/{id}", R::DeleteDependent, WRITER),
    route(Get, "/children", R::ListChildren, Access::permission(perm::FAMILIES_READ)),
    route(Post, "/children", R::CreateChild, WRITER),
    route(Delete, "/children/{id}", R::DeleteChild, WRITER),
    // Situação de rua
    route(Get, "/street/people", R::ListStreetPeople, Access::permission(perm::STREET_READ)),
    route(Post, "/street/people", R::CreateStreetPerson, WRITER),
    route(Post, "/street/referrals", R::CreateReferral, WRITER),
    route(Post, "/street/referrals/{id}/status", R::UpdateReferralStatus, WRITER),
    // Entregas
    route(Get, "/deliveries/events", R::ListEvents, Access::permission(perm::DELIVERIES_READ)),
    route(Post, "/deliveries/events", R::CreateEvent, WRITER),
    route(Post, "/deliveries/events/{id}/invites", R::InviteFamily, WRITER),
    route(Post, "/deliveries/events/{id}/publish", R::PublishEvent, WRITER),
    route(Post, "/deliveries/events/{id}/withdrawals", R::RegisterWithdrawal, WRITER),
    // Equipamentos
    route(Get, "/equipment", R::ListEquipment, Access::permission(perm::EQUIPMENT_READ)),
    route(Post, "/equipment", R::CreateEquipment, WRITER),
    route(Put, "/equipment/{id}", R::UpdateEquipment, WRITER),
    route(Get, "/equipment/loans", R::ListLoans, Access::permission(perm::EQUIPMENT_READ)),
    route(Post, "/equipment/loans", R::CreateLoan, WRITER),
    route(Post, "/equipment/loans/{id}/return", R::ReturnLoan, WRITER),
    // Relatórios
    route(Get, "/reports/summary", R::ReportSummary, Access::permission(perm::REPORTS_READ)),
    route(Get, "/reports/export.csv", R::ReportExport(ExportFormat::Csv), Access::permission(perm::REPORTS_READ)),
    route(Get, "/reports/export.xlsx", R::ReportExport(ExportFormat::Xlsx), Access::permission(perm::REPORTS_READ)),
    route(Get, "/reports/export.pdf", R::ReportExport(ExportFormat::Pdf), Access::permission(perm::REPORTS_READ)),
    route(Get, "/reports/monthly", R::MonthlyReport, Access::permission(perm::REPORTS_READ)),
    route(Get, "/reports/monthly/export.csv", R::MonthlyExport(ExportFormat::Csv), Access::permission(perm::REPORTS_READ)),
    route(Get, "/reports/monthly/export.xlsx", R::MonthlyExport(ExportFormat::Xlsx), Access::permission(perm::REPORTS_READ)),
    route(Get, "/reports/monthly/export.pdf", R::MonthlyExport(ExportFormat::Pdf), Access::permission(perm::REPORTS_READ)),
    // Configurações e elegibilidade
    route(Get, "/settings/eligibility", R::GetEligibilitySettings, Access::permission(perm::SETTINGS_READ)),
    route(Put, "/settings/eligibility", R::UpdateEligibilitySettings, Access::permission(perm::SETTINGS_WRITE)),
    route(Post, "/eligibility/check", R::CheckEligibility, Access::permission(perm::ELIGIBILITY_CHECK)),
    // Visitas
    route(Get, "/visits", R::ListVisits, Access::permission(perm::VISITS_READ)),
    route(Post, "/visits", R::CreateVisit, Access::permission(perm::VISITS_WRITE)),
    route(Post, "/visits/{id}/complete", R::CompleteVisit, Access::permission(perm::VISITS_WRITE)),
    route(Post, "/visits/{id}/cancel", R::CancelVisit, Access::permission(perm::VISITS_WRITE)),
];

#[derive(Debug, Clone, Copy)]
pub enum RouteMatch {
    Found { route: &'static Route, id: Option<u64> },
    MethodNotAllowed,
    NotFound,
}

/// Casa o caminho contra o padrão; `Some(id)` quando o padrão tem `{id}`.
fn match_pattern(pattern: &str, path: &str) -> Option<Option<u64>> {
    let mut expected = pattern.split('/');
    let mut actual = path.split('/');
    let mut id = None;

    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return Some(id),
            (Some("{id}"), Some(segment)) => {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                id = Some(segment.parse::<u64>().ok()?);
            }
            (Some(lit), Some(segment)) if lit == segment => {}
            _ => return None,
        }
    }
}

pub fn resolve(method: &Method, path: &str) -> RouteMatch {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    let mut path_known = false;
    for route in ROUTES {
        let Some(id) = match_pattern(route.pattern, path) else {
            continue;
        };
        if route.verb.matches(method) {
            return RouteMatch::Found { route, id };
        }
        path_known = true;
    }

    if path_known {
        RouteMatch::MethodNotAllowed
    } else {
        RouteMatch::NotFound
    }
}
