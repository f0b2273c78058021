// src/db/throttle_repo.rs

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    common::error::StorageError,
    db::snapshot::{Snapshot, StorageBackend},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ThrottleState {
    // identidade -> timestamps (unix) das falhas
    failures: BTreeMap<String, Vec<i64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleDecision {
    pub blocked: bool,
    pub attempts: usize,
}

/// Janela deslizante de falhas de login por identidade.
#[derive(Clone)]
pub struct ThrottleRepository {
    store: Arc<Snapshot<ThrottleState>>,
    window_secs: i64,
    max_attempts: usize,
}

impl ThrottleRepository {
    pub async fn open(
        backend: &StorageBackend,
        window_secs: i64,
        max_attempts: usize,
    ) -> Result<Self, StorageError> {
        Ok(Self {
            store: Arc::new(Snapshot::open(backend, "login_throttle").await?),
            window_secs,
            max_attempts,
        })
    }

    fn within_window(&self, ts: i64, now: i64) -> bool {
        now - ts <= self.window_secs
    }

    pub async fn is_blocked(&self, identity: &str, now: i64) -> bool {
        let attempts = self
            .store
            .read(|s| {
                s.failures.get(identity).map_or(0, |list| {
                    list.iter().filter(|ts| self.within_window(**ts, now)).count()
                })
            })
            .await;
        attempts >= self.max_attempts
    }

    /// Registra uma falha; bloqueia quando atinge o limite dentro da janela.
    pub async fn register_failure(
        &self,
        identity: &str,
        now: i64,
    ) -> Result<ThrottleDecision, StorageError> {
        self.store
            .write(|s| {
                self.prune(&mut s.failures, now);
                let list = s.failures.entry(identity.to_string()).or_default();
                list.push(now);

                let attempts = list.len();
                Ok(ThrottleDecision {
                    blocked: attempts >= self.max_attempts,
                    attempts,
                })
            })
            .await
    }

    /// Descarta identidades sem falhas dentro da janela.
    pub async fn purge_expired(&self, now: i64) -> Result<usize, StorageError> {
        self.store
            .write(|s| {
                let before = s.failures.len();
                self.prune(&mut s.failures, now);
                Ok(before - s.failures.len())
            })
            .await
    }

    fn prune(&self, failures: &mut BTreeMap<String, Vec<i64>>, now: i64) {
        failures.retain(|_, list| {
            list.retain(|ts| self.within_window(*ts, now));
            !list.is_empty()
        });
    }

    pub async fn clear(&self, identity: &str) -> Result<(), StorageError> {
        self.store
            .write(|s| {
                s.failures.remove(identity);
                Ok(())
            })
            .await
    }
}
