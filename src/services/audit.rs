// src/services/audit.rs

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

use crate::common::clock::Clock;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub action: String,
    pub request_id: String,
    pub actor: Option<u64>,
    pub at: DateTime<Utc>,
    pub context: Value,
}

/// Destino dos eventos de auditoria. Falhas do sink nunca derrubam a requisição.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: &AuditEvent);
}

// Padrão: um evento `audit_event` no log estruturado.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: &AuditEvent) {
        tracing::info!(
            target: "audit",
            action = %event.action,
            request_id = %event.request_id,
            actor = ?event.actor,
            context = %event.context,
            "audit_event"
        );
    }
}

/// Arquivo JSON-lines só de acréscimo.
pub struct FileAuditSink {
    file: Mutex<tokio::fs::File>,
}

impl FileAuditSink {
    pub async fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path).await?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl AuditSink for FileAuditSink {
    async fn record(&self, event: &AuditEvent) {
        let mut line = match serde_json::to_vec(event) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "Falha ao serializar evento de auditoria");
                return;
            }
        };
        line.push(b'\n');

        let mut file = self.file.lock().await;
        if let Err(e) = file.write_all(&line).await {
            tracing::error!(error = %e, action = %event.action, "Falha ao gravar auditoria");
        }
    }
}

// Usado nos testes para inspecionar o que foi auditado.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: parking_lot::Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.action.clone()).collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}

#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }

    pub async fn record(&self, request_id: &str, actor: Option<u64>, action: &str, context: Value) {
        let event = AuditEvent {
            action: action.to_string(),
            request_id: request_id.to_string(),
            actor,
            at: self.clock.now(),
            context,
        };
        self.sink.record(&event).await;
    }
}
