// src/models/equipment.rs

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::{error::DomainError, payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    Disponivel,
    Emprestado,
    Manutencao,
}

impl FromStr for EquipmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "disponivel" => Ok(EquipmentStatus::Disponivel),
            "emprestado" => Ok(EquipmentStatus::Emprestado),
            "manutencao" => Ok(EquipmentStatus::Manutencao),
            _ => Err(DomainError::InvalidStatus),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Aberto,
    Devolvido,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Equipment {
    pub id: u64,
    /// `EQ-0001`, `EQ-0002`...
    pub code: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub condition: String,
    pub notes: Option<String>,
    pub status: EquipmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EquipmentLoan {
    pub id: u64,
    pub equipment_id: u64,
    pub family_id: u64,
    pub loaned_at: NaiveDateTime,
    pub due_date: Option<NaiveDate>,
    pub returned_at: Option<NaiveDateTime>,
    pub return_condition: Option<String>,
    pub return_notes: Option<String>,
    pub status: LoanStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EquipmentPayload {
    #[serde(rename = "type", default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, message = "O tipo do equipamento é obrigatório."))]
    pub equipment_type: String,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub notes: Option<String>,
}

// Atualização parcial; `status` chega como texto e é validado no domínio.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EquipmentUpdatePayload {
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EquipmentChanges {
    pub status: Option<EquipmentStatus>,
    pub condition: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoanPayload {
    #[serde(deserialize_with = "payload::id")]
    pub equipment_id: u64,
    #[serde(deserialize_with = "payload::id")]
    pub family_id: u64,
    #[serde(default, deserialize_with = "payload::optional_date")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ReturnPayload {
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub notes: Option<String>,
}
