// src/models/social.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::payload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Family {
    pub id: u64,
    pub responsible_full_name: String,
    /// Somente dígitos.
    pub responsible_cpf: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dependent {
    pub id: u64,
    pub family_id: u64,
    pub full_name: String,
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Child {
    pub id: u64,
    pub family_id: u64,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct FamilyPayload {
    #[serde(default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, message = "O nome do responsável é obrigatório."))]
    pub responsible_full_name: String,
    #[serde(default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, message = "O CPF do responsável é obrigatório."))]
    pub responsible_cpf: String,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DependentPayload {
    #[serde(deserialize_with = "payload::id")]
    pub family_id: u64,
    #[serde(default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub full_name: String,
    #[serde(default, deserialize_with = "payload::optional_trimmed")]
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChildPayload {
    #[serde(deserialize_with = "payload::id")]
    pub family_id: u64,
    #[serde(default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub full_name: String,
    #[serde(default, deserialize_with = "payload::optional_date")]
    pub birth_date: Option<NaiveDate>,
}

/// Filtro opcional por família (`?family_id=`).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct FamilyFilter {
    #[serde(default, deserialize_with = "payload::optional_id")]
    pub family_id: Option<u64>,
}
