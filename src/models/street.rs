// src/models/street.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::payload;

pub const REFERRAL_PENDING: &str = "pendente";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StreetPerson {
    pub id: u64,
    pub full_name: String,
    pub concluded: bool,
    pub consent_accepted: bool,
    pub signature_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Referral {
    pub id: u64,
    pub person_id: u64,
    pub target: String,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct StreetPersonPayload {
    #[serde(default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub full_name: String,
    #[serde(default, deserialize_with = "payload::flag")]
    pub concluded: bool,
    #[serde(default, deserialize_with = "payload::flag")]
    pub consent_accepted: bool,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub signature_name: Option<String>,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReferralPayload {
    #[serde(deserialize_with = "payload::id")]
    pub person_id: u64,
    #[serde(default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, message = "O destino do encaminhamento é obrigatório."))]
    pub target: String,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReferralStatusPayload {
    #[serde(default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, max = 40, message = "O status é obrigatório."))]
    pub status: String,
}
