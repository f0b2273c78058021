// src/models/delivery.rs

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::payload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Aberto,
    Publicado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Convidado,
    Retirado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Retirou,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryEvent {
    pub id: u64,
    pub name: String,
    pub event_date: NaiveDate,
    pub status: EventStatus,
    pub published_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryInvite {
    pub id: u64,
    pub event_id: u64,
    pub family_id: u64,
    /// Sequencial por evento, começando em 1.
    pub ticket_number: u32,
    pub withdrawal_code: String,
    pub status: InviteStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryWithdrawal {
    pub id: u64,
    pub event_id: u64,
    pub family_id: u64,
    pub signature_accepted: bool,
    pub signature_name: String,
    pub status: WithdrawalStatus,
    pub withdrawn_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DeliveryEventPayload {
    #[serde(default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, message = "O nome do evento é obrigatório."))]
    pub name: String,
    #[serde(deserialize_with = "payload::date")]
    pub event_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct InvitePayload {
    #[serde(deserialize_with = "payload::id")]
    pub family_id: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct PublishPayload {
    #[serde(default, deserialize_with = "payload::optional_datetime")]
    pub published_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct WithdrawalPayload {
    #[serde(deserialize_with = "payload::id")]
    pub family_id: u64,
    #[serde(default, deserialize_with = "payload::flag")]
    pub signature_accepted: bool,
    #[serde(default, deserialize_with = "payload::trimmed")]
    pub signature_name: String,
}
