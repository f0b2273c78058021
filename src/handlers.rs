// src/handlers.rs

pub mod auth;
pub mod deliveries;
pub mod eligibility;
pub mod equipment;
pub mod families;
pub mod reports;
pub mod settings;
pub mod street;
pub mod system;
pub mod visits;

use axum::http::{HeaderMap, StatusCode};
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::{
    common::{error::AppError, payload},
    config::AppState,
    models::auth::User,
    services::export::ExportFile,
};

/// Tudo que um handler enxerga de uma requisição já autorizada.
pub struct RequestCtx<'a> {
    pub state: &'a AppState,
    pub request_id: &'a str,
    pub headers: &'a HeaderMap,
    pub user: Option<&'a User>,
    pub id: Option<u64>,
    pub payload: &'a Value,
}

impl RequestCtx<'_> {
    pub fn parse<T>(&self) -> Result<T, AppError>
    where
        T: DeserializeOwned + Validate,
    {
        payload::parse(self.payload)
    }

    /// O `{id}` da rota; as rotas com `{id}` só casam com dígitos.
    pub fn path_id(&self) -> Result<u64, AppError> {
        self.id.ok_or(AppError::RouteNotFound)
    }

    pub fn actor(&self) -> Option<u64> {
        self.user.map(|u| u.id)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.state.clock.now().naive_utc()
    }

    pub async fn audit(&self, action: &str, context: Value) {
        self.state
            .audit
            .record(self.request_id, self.actor(), action, context)
            .await;
    }
}

#[derive(Debug)]
pub enum Reply {
    Json { status: StatusCode, body: Value },
    File(ExportFile),
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Reply::Json {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn created(body: Value) -> Self {
        Reply::Json {
            status: StatusCode::CREATED,
            body,
        }
    }

    pub fn with_status(status: StatusCode, body: Value) -> Self {
        Reply::Json { status, body }
    }
}

pub type HandlerResult = Result<Reply, AppError>;
