// src/middleware/auth.rs

use axum::http::{header, HeaderMap};

use crate::{common::error::AppError, config::AppState, models::auth::User};

/// Extrai o token de `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

// Resolve o usuário da requisição ou falha com 401.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = bearer_token(headers).ok_or(AppError::MissingToken)?;
    state.auth_service.validate_token(token).await
}
