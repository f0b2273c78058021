// src/db/settings_repo.rs

use std::sync::Arc;

use crate::{
    common::error::{DomainError, StorageError},
    db::snapshot::{Snapshot, StorageBackend},
    models::settings::{EligibilitySettings, EligibilitySettingsPatch},
};

#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<Snapshot<EligibilitySettings>>,
}

impl SettingsRepository {
    pub async fn open(backend: &StorageBackend) -> Result<Self, StorageError> {
        Ok(Self {
            store: Arc::new(Snapshot::open(backend, "settings").await?),
        })
    }

    // Sem registro gravado, valem os padrões.
    pub async fn get_eligibility(&self) -> EligibilitySettings {
        self.store.read(|s| s.clone()).await
    }

    pub async fn update_eligibility(
        &self,
        patch: &EligibilitySettingsPatch,
    ) -> Result<EligibilitySettings, DomainError> {
        self.store
            .write(|s| {
                s.merge(patch);
                Ok(s.clone())
            })
            .await
    }
}
