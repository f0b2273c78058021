// src/common/error.rs

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

/// Entidades que podem não ser encontradas nos stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Family,
    Dependent,
    Child,
    Person,
    Referral,
    Event,
    Equipment,
    Loan,
    Visit,
}

impl Resource {
    pub fn code(self) -> &'static str {
        match self {
            Resource::Family => "family_not_found",
            Resource::Dependent => "dependent_not_found",
            Resource::Child => "child_not_found",
            Resource::Person => "person_not_found",
            Resource::Referral => "referral_not_found",
            Resource::Event => "event_not_found",
            Resource::Equipment => "equipment_not_found",
            Resource::Loan => "loan_not_found",
            Resource::Visit => "visit_not_found",
        }
    }
}

// Falhas do backend de arquivos JSON.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Falha de E/S no armazenamento: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot corrompido: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resultado "etiquetado" de toda operação de store.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Registro não encontrado ({})", .0.code())]
    NotFound(Resource),

    #[error("CPF já cadastrado")]
    DuplicateCpf,

    #[error("Equipamento indisponível")]
    EquipmentUnavailable,

    #[error("Empréstimo já encerrado")]
    LoanAlreadyClosed,

    #[error("Família já retirou no mês do evento")]
    DuplicateMonthWithdrawal,

    #[error("Evento publicado não aceita novos convites")]
    EventPublishedImmutable,

    #[error("Status inválido")]
    InvalidStatus,

    #[error("Assinatura obrigatória")]
    SignatureRequired,

    #[error("Consentimento obrigatório")]
    ConsentRequired,

    #[error("Erro de armazenamento")]
    Storage(#[from] StorageError),
}

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Payload inválido: {0}")]
    InvalidPayload(String),

    #[error("CPF inválido")]
    InvalidCpf,

    #[error("Período inválido")]
    InvalidPeriod,

    #[error("Token ausente")]
    MissingToken,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário do token não existe")]
    UnknownUser,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Muitas tentativas de login")]
    TooManyAttempts,

    #[error("Token de redefinição inválido ou expirado")]
    InvalidResetToken,

    #[error("Rota não encontrada")]
    RouteNotFound,

    #[error("Método não permitido")]
    MethodNotAllowed,

    #[error(transparent)]
    Domain(#[from] DomainError),

    // Qualquer outro erro inesperado; `anyhow::Error` carrega o contexto.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Domain(DomainError::Storage(err))
    }
}

impl AppError {
    /// Único ponto de mapeamento erro -> status HTTP.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidPayload(_)
            | AppError::InvalidCpf
            | AppError::InvalidPeriod
            | AppError::InvalidResetToken => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MissingToken
            | AppError::InvalidToken
            | AppError::UnknownUser
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Domain(err) => match err {
                DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                DomainError::DuplicateCpf
                | DomainError::EquipmentUnavailable
                | DomainError::LoanAlreadyClosed
                | DomainError::DuplicateMonthWithdrawal
                | DomainError::EventPublishedImmutable => StatusCode::CONFLICT,
                DomainError::InvalidStatus
                | DomainError::SignatureRequired
                | DomainError::ConsentRequired => StatusCode::UNPROCESSABLE_ENTITY,
                DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::InternalServerError(_) | AppError::BcryptError(_) | AppError::JwtError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Código estável devolvido no campo `error`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidPayload(_) => "invalid_payload",
            AppError::InvalidCpf => "invalid_cpf",
            AppError::InvalidPeriod => "invalid_period",
            AppError::MissingToken => "missing_token",
            AppError::InvalidToken => "invalid_token",
            AppError::UnknownUser => "unknown_user",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Forbidden => "forbidden",
            AppError::TooManyAttempts => "too_many_attempts",
            AppError::InvalidResetToken => "invalid_reset_token",
            AppError::RouteNotFound => "not_found",
            AppError::MethodNotAllowed => "method_not_allowed",
            AppError::Domain(err) => match err {
                DomainError::NotFound(resource) => resource.code(),
                DomainError::DuplicateCpf => "duplicate_cpf",
                DomainError::EquipmentUnavailable => "equipment_unavailable",
                DomainError::LoanAlreadyClosed => "loan_already_closed",
                DomainError::DuplicateMonthWithdrawal => "duplicate_month_withdrawal",
                DomainError::EventPublishedImmutable => "event_published_immutable",
                DomainError::InvalidStatus => "invalid_status",
                DomainError::SignatureRequired => "signature_required",
                DomainError::ConsentRequired => "consent_required",
                DomainError::Storage(_) => "internal_error",
            },
            AppError::InternalServerError(_) | AppError::BcryptError(_) | AppError::JwtError(_) => {
                "internal_error"
            }
        }
    }

    /// Corpo JSON do erro. Erros 5xx nunca expõem detalhes internos.
    pub fn to_body(&self, request_id: &str) -> Value {
        if self.status().is_server_error() {
            tracing::error!(request_id, "Erro Interno do Servidor: {:?}", self);
        }

        let mut body = json!({
            "error": self.code(),
            "request_id": request_id,
        });

        match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                body["details"] = json!(details);
            }
            AppError::InvalidPayload(reason) => {
                body["details"] = json!({ "payload": [reason] });
            }
            _ => {}
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_conflict_or_not_found() {
        let err = AppError::from(DomainError::NotFound(Resource::Loan));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "loan_not_found");

        let err = AppError::from(DomainError::DuplicateMonthWithdrawal);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "duplicate_month_withdrawal");
    }

    #[test]
    fn server_errors_hide_internals() {
        let err = AppError::InternalServerError(anyhow::anyhow!("disk on fire at /var/data"));
        let body = err.to_body("req-1");
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["request_id"], "req-1");
        assert!(!body.to_string().contains("disk on fire"));
    }

    #[test]
    fn storage_failures_are_internal() {
        let io = std::io::Error::other("boom");
        let err = AppError::from(StorageError::from(io));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
