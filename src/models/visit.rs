// src/models/visit.rs

use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::{error::DomainError, payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    Pendente,
    Concluida,
    Cancelada,
}

impl VisitStatus {
    pub const ALL: [VisitStatus; 3] = [
        VisitStatus::Pendente,
        VisitStatus::Concluida,
        VisitStatus::Cancelada,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisitStatus::Pendente => "pendente",
            VisitStatus::Concluida => "concluida",
            VisitStatus::Cancelada => "cancelada",
        }
    }
}

impl FromStr for VisitStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VisitStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or(DomainError::InvalidStatus)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Visit {
    pub id: u64,
    pub person_id: u64,
    pub family_id: Option<u64>,
    pub scheduled_for: NaiveDateTime,
    pub notes: Option<String>,
    pub status: VisitStatus,
    /// Preenchido apenas na conclusão.
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VisitPayload {
    #[serde(deserialize_with = "payload::id")]
    pub person_id: u64,
    #[serde(default, deserialize_with = "payload::optional_id")]
    pub family_id: Option<u64>,
    #[serde(deserialize_with = "payload::datetime")]
    pub scheduled_for: NaiveDateTime,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CompleteVisitPayload {
    #[serde(default, deserialize_with = "payload::optional_datetime")]
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VisitFilter {
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub status: Option<String>,
}
