// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Assistência Social API", description = "Cadastro e acompanhamento de famílias atendidas"),
    paths(
        // --- System ---
        handlers::system::health,
        handlers::system::ready,
        handlers::system::admin_ping,

        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::forgot,
        handlers::auth::reset,

        // --- Users ---
        handlers::system::me,

        // --- Families ---
        handlers::families::list_families,
        handlers::families::get_family,
        handlers::families::create_family,
        handlers::families::update_family,
        handlers::families::delete_family,
        handlers::families::list_dependents,
        handlers::families::create_dependent,
        handlers::families::delete_dependent,
        handlers::families::list_children,
        handlers::families::create_child,
        handlers::families::delete_child,

        // --- Street ---
        handlers::street::list_people,
        handlers::street::create_person,
        handlers::street::create_referral,
        handlers::street::update_referral_status,

        // --- Deliveries ---
        handlers::deliveries::list_events,
        handlers::deliveries::create_event,
        handlers::deliveries::invite_family,
        handlers::deliveries::publish_event,
        handlers::deliveries::register_withdrawal,

        // --- Equipment ---
        handlers::equipment::list_equipment,
        handlers::equipment::create_equipment,
        handlers::equipment::update_equipment,
        handlers::equipment::list_loans,
        handlers::equipment::create_loan,
        handlers::equipment::return_loan,

        // --- Reports ---
        handlers::reports::summary,
        handlers::reports::export_csv,
        handlers::reports::export_xlsx,
        handlers::reports::export_pdf,
        handlers::reports::monthly,
        handlers::reports::monthly_export_csv,
        handlers::reports::monthly_export_xlsx,
        handlers::reports::monthly_export_pdf,

        // --- Settings / Eligibility ---
        handlers::settings::get_eligibility,
        handlers::settings::update_eligibility,
        handlers::eligibility::check,

        // --- Visits ---
        handlers::visits::list,
        handlers::visits::create,
        handlers::visits::complete,
        handlers::visits::cancel,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::UserProfile,
            models::auth::LoginPayload,
            models::auth::LoginResponse,
            models::auth::ForgotPasswordPayload,
            models::auth::ResetPasswordPayload,

            // --- Families ---
            models::social::Family,
            models::social::Dependent,
            models::social::Child,
            models::social::FamilyPayload,
            models::social::DependentPayload,
            models::social::ChildPayload,

            // --- Street ---
            models::street::StreetPerson,
            models::street::Referral,
            models::street::StreetPersonPayload,
            models::street::ReferralPayload,
            models::street::ReferralStatusPayload,

            // --- Deliveries ---
            models::delivery::EventStatus,
            models::delivery::InviteStatus,
            models::delivery::WithdrawalStatus,
            models::delivery::DeliveryEvent,
            models::delivery::DeliveryInvite,
            models::delivery::DeliveryWithdrawal,
            models::delivery::DeliveryEventPayload,
            models::delivery::InvitePayload,
            models::delivery::PublishPayload,
            models::delivery::WithdrawalPayload,

            // --- Equipment ---
            models::equipment::EquipmentStatus,
            models::equipment::LoanStatus,
            models::equipment::Equipment,
            models::equipment::EquipmentLoan,
            models::equipment::EquipmentPayload,
            models::equipment::EquipmentUpdatePayload,
            models::equipment::LoanPayload,
            models::equipment::ReturnPayload,

            // --- Reports ---
            models::reports::ReportSummary,
            models::reports::MonthlySummary,
            models::reports::MonthlyReport,

            // --- Settings ---
            models::settings::EligibilitySettings,
            models::settings::EligibilitySettingsPatch,
            models::settings::EligibilityFacts,
            models::settings::IneligibilityReason,
            models::settings::EligibilityResult,

            // --- Visits ---
            models::visit::VisitStatus,
            models::visit::Visit,
            models::visit::VisitPayload,
            models::visit::CompleteVisitPayload,
        )
    ),
    tags(
        (name = "System", description = "Saúde e prontidão do serviço"),
        (name = "Auth", description = "Login, logout e redefinição de senha"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Families", description = "Famílias, dependentes e crianças"),
        (name = "Street", description = "Atendimento à população de rua"),
        (name = "Deliveries", description = "Eventos de entrega, convites e retiradas"),
        (name = "Equipment", description = "Equipamentos e empréstimos"),
        (name = "Reports", description = "Indicadores e exportações"),
        (name = "Settings", description = "Regras de elegibilidade"),
        (name = "Eligibility", description = "Avaliação de elegibilidade"),
        (name = "Visits", description = "Visitas domiciliares")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
