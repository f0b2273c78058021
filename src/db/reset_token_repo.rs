// src/db/reset_token_repo.rs

use std::{collections::BTreeMap, sync::Arc};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    common::error::StorageError,
    db::snapshot::{Snapshot, StorageBackend},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResetTokenRecord {
    email: String,
    expires_at: i64,
    created_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ResetTokenState {
    // chave: hash do token; o texto puro nunca é guardado
    tokens: BTreeMap<String, ResetTokenRecord>,
}

#[derive(Clone)]
pub struct ResetTokenRepository {
    store: Arc<Snapshot<ResetTokenState>>,
}

impl ResetTokenRepository {
    pub async fn open(backend: &StorageBackend) -> Result<Self, StorageError> {
        Ok(Self {
            store: Arc::new(Snapshot::open(backend, "reset_tokens").await?),
        })
    }

    /// Emite um token de uso único e devolve o texto puro.
    pub async fn issue(&self, email: &str, now: i64, ttl_secs: i64) -> Result<String, StorageError> {
        let mut raw = [0u8; 32];
        OsRng.fill_bytes(&mut raw);
        let token = URL_SAFE_NO_PAD.encode(raw);

        let record = ResetTokenRecord {
            email: email.to_string(),
            expires_at: now + ttl_secs,
            created_at: now,
        };
        let key = token_hash(&token);

        self.store
            .write(|s| {
                s.tokens.insert(key, record);
                Ok::<_, StorageError>(())
            })
            .await?;

        Ok(token)
    }

    /// Consome o token (sempre o remove) e devolve o e-mail se ainda válido.
    pub async fn consume(&self, token: &str, now: i64) -> Result<Option<String>, StorageError> {
        let key = token_hash(token.trim());

        self.store
            .write(|s| {
                let record = s.tokens.remove(&key);
                Ok(record
                    .filter(|r| r.expires_at >= now)
                    .map(|r| r.email))
            })
            .await
    }

    pub async fn purge_expired(&self, now: i64) -> Result<usize, StorageError> {
        self.store
            .write(|s| {
                let before = s.tokens.len();
                s.tokens.retain(|_, r| r.expires_at >= now);
                Ok(before - s.tokens.len())
            })
            .await
    }
}

fn token_hash(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}
