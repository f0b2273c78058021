// src/db/delivery_repo.rs

use std::{collections::BTreeMap, sync::Arc};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    common::error::{DomainError, Resource, StorageError},
    db::{
        next_id,
        snapshot::{Snapshot, StorageBackend},
    },
    models::delivery::{
        DeliveryEvent, DeliveryEventPayload, DeliveryInvite, DeliveryWithdrawal, EventStatus,
        InviteStatus, WithdrawalPayload, WithdrawalStatus,
    },
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DeliveryState {
    events: BTreeMap<u64, DeliveryEvent>,
    invites: BTreeMap<u64, DeliveryInvite>,
    withdrawals: BTreeMap<u64, DeliveryWithdrawal>,
    // último número de senha emitido por evento
    tickets: BTreeMap<u64, u32>,
    event_seq: u64,
    invite_seq: u64,
    withdrawal_seq: u64,
}

impl DeliveryState {
    fn event(&self, id: u64) -> Result<&DeliveryEvent, DomainError> {
        self.events.get(&id).ok_or(DomainError::NotFound(Resource::Event))
    }

    fn month_of(&self, event_id: u64) -> Option<(i32, u32)> {
        self.events
            .get(&event_id)
            .map(|e| (e.event_date.year(), e.event_date.month()))
    }
}

/// Resultado de operações idempotentes: a entidade e se houve mudança.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub item: T,
    pub changed: bool,
}

#[derive(Clone)]
pub struct DeliveryRepository {
    store: Arc<Snapshot<DeliveryState>>,
}

impl DeliveryRepository {
    pub async fn open(backend: &StorageBackend) -> Result<Self, StorageError> {
        Ok(Self {
            store: Arc::new(Snapshot::open(backend, "deliveries").await?),
        })
    }

    pub async fn list_events(&self) -> Vec<DeliveryEvent> {
        self.store.read(|s| s.events.values().cloned().collect()).await
    }

    pub async fn get_event(&self, id: u64) -> Result<DeliveryEvent, DomainError> {
        self.store.read(|s| s.event(id).cloned()).await
    }

    pub async fn list_invites(&self) -> Vec<DeliveryInvite> {
        self.store.read(|s| s.invites.values().cloned().collect()).await
    }

    pub async fn list_withdrawals(&self) -> Vec<DeliveryWithdrawal> {
        self.store.read(|s| s.withdrawals.values().cloned().collect()).await
    }

    pub async fn create_event(&self, payload: DeliveryEventPayload) -> Result<DeliveryEvent, DomainError> {
        self.store
            .write(|s| {
                let event = DeliveryEvent {
                    id: next_id(&mut s.event_seq),
                    name: payload.name,
                    event_date: payload.event_date,
                    status: EventStatus::Aberto,
                    published_at: None,
                };
                s.events.insert(event.id, event.clone());
                Ok(event)
            })
            .await
    }

    /// Convida a família. Reconvidar devolve o convite existente (`changed = false`).
    pub async fn invite_family(
        &self,
        event_id: u64,
        family_id: u64,
    ) -> Result<Outcome<DeliveryInvite>, DomainError> {
        self.store
            .write(|s| {
                if s.event(event_id)?.status == EventStatus::Publicado {
                    return Err(DomainError::EventPublishedImmutable);
                }

                if let Some(existing) = s
                    .invites
                    .values()
                    .find(|i| i.event_id == event_id && i.family_id == family_id)
                {
                    return Ok(Outcome {
                        item: existing.clone(),
                        changed: false,
                    });
                }

                let id = next_id(&mut s.invite_seq);
                let ticket = s.tickets.entry(event_id).or_insert(0);
                *ticket += 1;

                let invite = DeliveryInvite {
                    id,
                    event_id,
                    family_id,
                    ticket_number: *ticket,
                    withdrawal_code: withdrawal_code(event_id, family_id, id),
                    status: InviteStatus::Convidado,
                };
                s.invites.insert(id, invite.clone());
                Ok(Outcome {
                    item: invite,
                    changed: true,
                })
            })
            .await
    }

    /// Publica o evento; republicar não altera `published_at`.
    pub async fn publish_event(
        &self,
        event_id: u64,
        published_at: NaiveDateTime,
    ) -> Result<Outcome<DeliveryEvent>, DomainError> {
        self.store
            .write(|s| {
                let event = s
                    .events
                    .get_mut(&event_id)
                    .ok_or(DomainError::NotFound(Resource::Event))?;

                if event.status == EventStatus::Publicado {
                    return Ok(Outcome {
                        item: event.clone(),
                        changed: false,
                    });
                }

                event.status = EventStatus::Publicado;
                event.published_at = Some(published_at);
                Ok(Outcome {
                    item: event.clone(),
                    changed: true,
                })
            })
            .await
    }

    /// Uma retirada por família por mês civil (mês da data do evento).
    pub async fn register_withdrawal(
        &self,
        event_id: u64,
        payload: WithdrawalPayload,
        now: NaiveDateTime,
    ) -> Result<DeliveryWithdrawal, DomainError> {
        self.store
            .write(|s| {
                let event_date: NaiveDate = s.event(event_id)?.event_date;
                let month = (event_date.year(), event_date.month());

                let already = s
                    .withdrawals
                    .values()
                    .filter(|w| w.family_id == payload.family_id)
                    .any(|w| s.month_of(w.event_id) == Some(month));
                if already {
                    return Err(DomainError::DuplicateMonthWithdrawal);
                }

                if !payload.signature_accepted || payload.signature_name.trim().is_empty() {
                    return Err(DomainError::SignatureRequired);
                }

                let withdrawal = DeliveryWithdrawal {
                    id: next_id(&mut s.withdrawal_seq),
                    event_id,
                    family_id: payload.family_id,
                    signature_accepted: true,
                    signature_name: payload.signature_name,
                    status: WithdrawalStatus::Retirou,
                    withdrawn_at: now,
                };
                s.withdrawals.insert(withdrawal.id, withdrawal.clone());

                if let Some(invite) = s
                    .invites
                    .values_mut()
                    .find(|i| i.event_id == event_id && i.family_id == withdrawal.family_id)
                {
                    invite.status = InviteStatus::Retirado;
                }

                Ok(withdrawal)
            })
            .await
    }
}

/// Código curto de retirada: 6 primeiros hex (maiúsculos) do SHA-256.
fn withdrawal_code(event_id: u64, family_id: u64, invite_id: u64) -> String {
    let digest = Sha256::digest(format!("{event_id}-{family_id}-{invite_id}").as_bytes());
    digest[..3].iter().map(|b| format!("{b:02X}")).collect()
}
