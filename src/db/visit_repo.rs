// src/db/visit_repo.rs

use std::{collections::BTreeMap, sync::Arc};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    common::error::{DomainError, Resource, StorageError},
    db::{
        next_id,
        snapshot::{Snapshot, StorageBackend},
    },
    models::visit::{Visit, VisitPayload, VisitStatus},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct VisitState {
    visits: BTreeMap<u64, Visit>,
    visit_seq: u64,
}

#[derive(Clone)]
pub struct VisitRepository {
    store: Arc<Snapshot<VisitState>>,
}

impl VisitRepository {
    pub async fn open(backend: &StorageBackend) -> Result<Self, StorageError> {
        Ok(Self {
            store: Arc::new(Snapshot::open(backend, "visits").await?),
        })
    }

    pub async fn list(&self, status: Option<VisitStatus>) -> Vec<Visit> {
        self.store
            .read(|s| {
                s.visits
                    .values()
                    .filter(|v| status.is_none_or(|st| v.status == st))
                    .cloned()
                    .collect()
            })
            .await
    }

    pub async fn create(&self, payload: VisitPayload) -> Result<Visit, DomainError> {
        self.store
            .write(|s| {
                let visit = Visit {
                    id: next_id(&mut s.visit_seq),
                    person_id: payload.person_id,
                    family_id: payload.family_id,
                    scheduled_for: payload.scheduled_for,
                    notes: payload.notes,
                    status: VisitStatus::Pendente,
                    completed_at: None,
                };
                s.visits.insert(visit.id, visit.clone());
                Ok(visit)
            })
            .await
    }

    pub async fn complete(&self, id: u64, completed_at: NaiveDateTime) -> Result<Visit, DomainError> {
        self.transition(id, VisitStatus::Concluida, Some(completed_at)).await
    }

    pub async fn cancel(&self, id: u64) -> Result<Visit, DomainError> {
        self.transition(id, VisitStatus::Cancelada, None).await
    }

    // Só visitas pendentes mudam de status.
    async fn transition(
        &self,
        id: u64,
        to: VisitStatus,
        completed_at: Option<NaiveDateTime>,
    ) -> Result<Visit, DomainError> {
        self.store
            .write(|s| {
                let visit = s
                    .visits
                    .get_mut(&id)
                    .ok_or(DomainError::NotFound(Resource::Visit))?;
                if visit.status != VisitStatus::Pendente {
                    return Err(DomainError::InvalidStatus);
                }

                visit.status = to;
                visit.completed_at = completed_at;
                Ok(visit.clone())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::payload::parse_datetime;

    async fn repo_with_visit() -> (VisitRepository, Visit) {
        let repo = VisitRepository::open(&StorageBackend::Memory).await.unwrap();
        let visit = repo
            .create(VisitPayload {
                person_id: 1,
                family_id: None,
                scheduled_for: parse_datetime("2026-01-10 14:00:00").unwrap(),
                notes: Some("primeira visita".into()),
            })
            .await
            .unwrap();
        (repo, visit)
    }

    #[tokio::test]
    async fn completion_sets_timestamp_once() {
        let (repo, visit) = repo_with_visit().await;
        assert_eq!(visit.status, VisitStatus::Pendente);
        assert_eq!(visit.completed_at, None);

        let at = parse_datetime("2026-01-10 15:30:00").unwrap();
        let done = repo.complete(visit.id, at).await.unwrap();
        assert_eq!(done.status, VisitStatus::Concluida);
        assert_eq!(done.completed_at, Some(at));

        assert!(matches!(
            repo.complete(visit.id, at).await,
            Err(DomainError::InvalidStatus)
        ));
        assert!(matches!(repo.cancel(visit.id).await, Err(DomainError::InvalidStatus)));
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let (repo, visit) = repo_with_visit().await;
        repo.create(VisitPayload {
            person_id: 2,
            family_id: Some(3),
            scheduled_for: parse_datetime("2026-01-11 09:00:00").unwrap(),
            notes: None,
        })
        .await
        .unwrap();
        repo.cancel(visit.id).await.unwrap();

        assert_eq!(repo.list(None).await.len(), 2);
        assert_eq!(repo.list(Some(VisitStatus::Pendente)).await.len(), 1);
        assert_eq!(repo.list(Some(VisitStatus::Cancelada)).await[0].id, visit.id);
        assert!(repo.list(Some(VisitStatus::Concluida)).await.is_empty());
    }
}
