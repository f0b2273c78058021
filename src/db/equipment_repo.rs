// src/db/equipment_repo.rs

use std::{collections::BTreeMap, sync::Arc};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    common::error::{DomainError, Resource, StorageError},
    db::{
        next_id,
        snapshot::{Snapshot, StorageBackend},
    },
    models::equipment::{
        Equipment, EquipmentChanges, EquipmentLoan, EquipmentPayload, EquipmentStatus, LoanPayload,
        LoanStatus, ReturnPayload,
    },
};

const DEFAULT_CONDITION: &str = "bom";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EquipmentState {
    equipment: BTreeMap<u64, Equipment>,
    loans: BTreeMap<u64, EquipmentLoan>,
    equipment_seq: u64,
    loan_seq: u64,
}

#[derive(Clone)]
pub struct EquipmentRepository {
    store: Arc<Snapshot<EquipmentState>>,
}

impl EquipmentRepository {
    pub async fn open(backend: &StorageBackend) -> Result<Self, StorageError> {
        Ok(Self {
            store: Arc::new(Snapshot::open(backend, "equipment").await?),
        })
    }

    pub async fn list_equipment(&self) -> Vec<Equipment> {
        self.store.read(|s| s.equipment.values().cloned().collect()).await
    }

    pub async fn list_loans(&self) -> Vec<EquipmentLoan> {
        self.store.read(|s| s.loans.values().cloned().collect()).await
    }

    pub async fn create_equipment(&self, payload: EquipmentPayload) -> Result<Equipment, DomainError> {
        self.store
            .write(|s| {
                let id = next_id(&mut s.equipment_seq);
                let equipment = Equipment {
                    id,
                    code: format!("EQ-{id:04}"),
                    equipment_type: payload.equipment_type,
                    condition: payload
                        .condition
                        .unwrap_or_else(|| DEFAULT_CONDITION.to_string()),
                    notes: payload.notes,
                    status: EquipmentStatus::Disponivel,
                };
                s.equipment.insert(id, equipment.clone());
                Ok(equipment)
            })
            .await
    }

    pub async fn update_equipment(
        &self,
        id: u64,
        changes: EquipmentChanges,
    ) -> Result<Equipment, DomainError> {
        self.store
            .write(|s| {
                let equipment = s
                    .equipment
                    .get_mut(&id)
                    .ok_or(DomainError::NotFound(Resource::Equipment))?;

                if let Some(status) = changes.status {
                    equipment.status = status;
                }
                if let Some(condition) = changes.condition {
                    equipment.condition = condition;
                }
                if changes.notes.is_some() {
                    equipment.notes = changes.notes;
                }
                Ok(equipment.clone())
            })
            .await
    }

    /// Empresta um equipamento disponível; ele passa a `emprestado`.
    pub async fn create_loan(
        &self,
        payload: LoanPayload,
        now: NaiveDateTime,
    ) -> Result<EquipmentLoan, DomainError> {
        self.store
            .write(|s| {
                let equipment = s
                    .equipment
                    .get_mut(&payload.equipment_id)
                    .ok_or(DomainError::NotFound(Resource::Equipment))?;
                if equipment.status != EquipmentStatus::Disponivel {
                    return Err(DomainError::EquipmentUnavailable);
                }
                equipment.status = EquipmentStatus::Emprestado;

                let loan = EquipmentLoan {
                    id: next_id(&mut s.loan_seq),
                    equipment_id: payload.equipment_id,
                    family_id: payload.family_id,
                    loaned_at: now,
                    due_date: payload.due_date,
                    returned_at: None,
                    return_condition: None,
                    return_notes: None,
                    status: LoanStatus::Aberto,
                };
                s.loans.insert(loan.id, loan.clone());
                Ok(loan)
            })
            .await
    }

    /// Devolve o empréstimo e libera o equipamento; condição e observações
    /// passam a ser as da devolução.
    pub async fn return_loan(
        &self,
        loan_id: u64,
        payload: ReturnPayload,
        now: NaiveDateTime,
    ) -> Result<EquipmentLoan, DomainError> {
        self.store
            .write(|s| {
                let loan = s
                    .loans
                    .get_mut(&loan_id)
                    .ok_or(DomainError::NotFound(Resource::Loan))?;
                if loan.status != LoanStatus::Aberto {
                    return Err(DomainError::LoanAlreadyClosed);
                }

                loan.status = LoanStatus::Devolvido;
                loan.returned_at = Some(now);
                loan.return_condition = payload.condition.clone();
                loan.return_notes = payload.notes.clone();
                let loan = loan.clone();

                if let Some(equipment) = s.equipment.get_mut(&loan.equipment_id) {
                    equipment.status = EquipmentStatus::Disponivel;
                    equipment.condition = payload
                        .condition
                        .unwrap_or_else(|| DEFAULT_CONDITION.to_string());
                    equipment.notes = payload.notes;
                }

                Ok(loan)
            })
            .await
    }
}
