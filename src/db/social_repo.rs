// src/db/social_repo.rs

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    common::error::{DomainError, Resource, StorageError},
    db::{
        next_id,
        snapshot::{Snapshot, StorageBackend},
    },
    models::social::{Child, ChildPayload, Dependent, DependentPayload, Family, FamilyPayload},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SocialState {
    families: BTreeMap<u64, Family>,
    dependents: BTreeMap<u64, Dependent>,
    children: BTreeMap<u64, Child>,
    family_seq: u64,
    dependent_seq: u64,
    child_seq: u64,
}

impl SocialState {
    fn cpf_taken(&self, cpf: &str, ignore_id: Option<u64>) -> bool {
        self.families
            .values()
            .any(|f| f.responsible_cpf == cpf && Some(f.id) != ignore_id)
    }
}

// Famílias, dependentes e crianças.
#[derive(Clone)]
pub struct SocialRepository {
    store: Arc<Snapshot<SocialState>>,
}

impl SocialRepository {
    pub async fn open(backend: &StorageBackend) -> Result<Self, StorageError> {
        Ok(Self {
            store: Arc::new(Snapshot::open(backend, "social").await?),
        })
    }

    pub async fn list_families(&self) -> Vec<Family> {
        self.store.read(|s| s.families.values().cloned().collect()).await
    }

    pub async fn get_family(&self, id: u64) -> Result<Family, DomainError> {
        self.store
            .read(|s| s.families.get(&id).cloned())
            .await
            .ok_or(DomainError::NotFound(Resource::Family))
    }

    /// Roda `op` com a família garantida: ela não pode ser removida no meio.
    /// `op` não deve tocar este repositório.
    pub async fn with_family<T, E, Fut>(&self, id: u64, op: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: From<DomainError>,
    {
        self.store
            .read_while(
                |s| {
                    if s.families.contains_key(&id) {
                        Ok(())
                    } else {
                        Err(DomainError::NotFound(Resource::Family).into())
                    }
                },
                op,
            )
            .await
    }

    /// `cpf` já normalizado (somente dígitos).
    pub async fn create_family(&self, payload: FamilyPayload, cpf: String) -> Result<Family, DomainError> {
        self.store
            .write(|s| {
                if s.cpf_taken(&cpf, None) {
                    return Err(DomainError::DuplicateCpf);
                }

                let family = Family {
                    id: next_id(&mut s.family_seq),
                    responsible_full_name: payload.responsible_full_name,
                    responsible_cpf: cpf,
                    phone: payload.phone,
                    address: payload.address,
                };
                s.families.insert(family.id, family.clone());
                Ok(family)
            })
            .await
    }

    pub async fn update_family(
        &self,
        id: u64,
        payload: FamilyPayload,
        cpf: String,
    ) -> Result<Family, DomainError> {
        self.store
            .write(|s| {
                if !s.families.contains_key(&id) {
                    return Err(DomainError::NotFound(Resource::Family));
                }
                if s.cpf_taken(&cpf, Some(id)) {
                    return Err(DomainError::DuplicateCpf);
                }

                let family = s
                    .families
                    .get_mut(&id)
                    .ok_or(DomainError::NotFound(Resource::Family))?;
                family.responsible_full_name = payload.responsible_full_name;
                family.responsible_cpf = cpf;
                family.phone = payload.phone;
                family.address = payload.address;
                Ok(family.clone())
            })
            .await
    }

    /// Remove a família junto com seus dependentes e crianças.
    pub async fn delete_family(&self, id: u64) -> Result<(), DomainError> {
        self.store
            .write(|s| {
                s.families
                    .remove(&id)
                    .ok_or(DomainError::NotFound(Resource::Family))?;
                s.dependents.retain(|_, d| d.family_id != id);
                s.children.retain(|_, c| c.family_id != id);
                Ok(())
            })
            .await
    }

    pub async fn list_dependents(&self, family_id: Option<u64>) -> Vec<Dependent> {
        self.store
            .read(|s| {
                s.dependents
                    .values()
                    .filter(|d| family_id.is_none_or(|f| d.family_id == f))
                    .cloned()
                    .collect()
            })
            .await
    }

    pub async fn create_dependent(&self, payload: DependentPayload) -> Result<Dependent, DomainError> {
        self.store
            .write(|s| {
                if !s.families.contains_key(&payload.family_id) {
                    return Err(DomainError::NotFound(Resource::Family));
                }

                let dependent = Dependent {
                    id: next_id(&mut s.dependent_seq),
                    family_id: payload.family_id,
                    full_name: payload.full_name,
                    relationship: payload.relationship,
                };
                s.dependents.insert(dependent.id, dependent.clone());
                Ok(dependent)
            })
            .await
    }

    pub async fn delete_dependent(&self, id: u64) -> Result<(), DomainError> {
        self.store
            .write(|s| {
                s.dependents
                    .remove(&id)
                    .map(|_| ())
                    .ok_or(DomainError::NotFound(Resource::Dependent))
            })
            .await
    }

    pub async fn list_children(&self, family_id: Option<u64>) -> Vec<Child> {
        self.store
            .read(|s| {
                s.children
                    .values()
                    .filter(|c| family_id.is_none_or(|f| c.family_id == f))
                    .cloned()
                    .collect()
            })
            .await
    }

    pub async fn create_child(&self, payload: ChildPayload) -> Result<Child, DomainError> {
        self.store
            .write(|s| {
                if !s.families.contains_key(&payload.family_id) {
                    return Err(DomainError::NotFound(Resource::Family));
                }

                let child = Child {
                    id: next_id(&mut s.child_seq),
                    family_id: payload.family_id,
                    full_name: payload.full_name,
                    birth_date: payload.birth_date,
                };
                s.children.insert(child.id, child.clone());
                Ok(child)
            })
            .await
    }

    pub async fn delete_child(&self, id: u64) -> Result<(), DomainError> {
        self.store
            .write(|s| {
                s.children
                    .remove(&id)
                    .map(|_| ())
                    .ok_or(DomainError::NotFound(Resource::Child))
            })
            .await
    }

    /// Totais (famílias, dependentes, crianças) para os relatórios.
    pub async fn counts(&self) -> (u64, u64, u64) {
        self.store
            .read(|s| {
                (
                    s.families.len() as u64,
                    s.dependents.len() as u64,
                    s.children.len() as u64,
                )
            })
            .await
    }
}
