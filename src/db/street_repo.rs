// src/db/street_repo.rs

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    common::error::{DomainError, Resource, StorageError},
    db::{
        next_id,
        snapshot::{Snapshot, StorageBackend},
    },
    models::street::{Referral, ReferralPayload, StreetPerson, StreetPersonPayload, REFERRAL_PENDING},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StreetState {
    people: BTreeMap<u64, StreetPerson>,
    referrals: BTreeMap<u64, Referral>,
    person_seq: u64,
    referral_seq: u64,
}

#[derive(Clone)]
pub struct StreetRepository {
    store: Arc<Snapshot<StreetState>>,
}

impl StreetRepository {
    pub async fn open(backend: &StorageBackend) -> Result<Self, StorageError> {
        Ok(Self {
            store: Arc::new(Snapshot::open(backend, "street").await?),
        })
    }

    pub async fn list_people(&self) -> Vec<StreetPerson> {
        self.store.read(|s| s.people.values().cloned().collect()).await
    }

    pub async fn list_referrals(&self) -> Vec<Referral> {
        self.store.read(|s| s.referrals.values().cloned().collect()).await
    }

    /// Atendimento concluído exige consentimento aceito e nome de assinatura.
    pub async fn create_person(&self, payload: StreetPersonPayload) -> Result<StreetPerson, DomainError> {
        let signed = payload
            .signature_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        if payload.concluded && !(payload.consent_accepted && signed) {
            return Err(DomainError::ConsentRequired);
        }

        self.store
            .write(|s| {
                let person = StreetPerson {
                    id: next_id(&mut s.person_seq),
                    full_name: payload.full_name,
                    concluded: payload.concluded,
                    consent_accepted: payload.consent_accepted,
                    signature_name: payload.signature_name,
                    notes: payload.notes,
                };
                s.people.insert(person.id, person.clone());
                Ok(person)
            })
            .await
    }

    pub async fn create_referral(&self, payload: ReferralPayload) -> Result<Referral, DomainError> {
        self.store
            .write(|s| {
                if !s.people.contains_key(&payload.person_id) {
                    return Err(DomainError::NotFound(Resource::Person));
                }

                let referral = Referral {
                    id: next_id(&mut s.referral_seq),
                    person_id: payload.person_id,
                    target: payload.target,
                    status: REFERRAL_PENDING.to_string(),
                    notes: payload.notes,
                };
                s.referrals.insert(referral.id, referral.clone());
                Ok(referral)
            })
            .await
    }

    pub async fn update_referral_status(&self, id: u64, status: String) -> Result<Referral, DomainError> {
        self.store
            .write(|s| {
                let referral = s
                    .referrals
                    .get_mut(&id)
                    .ok_or(DomainError::NotFound(Resource::Referral))?;
                referral.status = status;
                Ok(referral.clone())
            })
            .await
    }
}
