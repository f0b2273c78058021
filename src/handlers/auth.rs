// src/handlers/auth.rs

use serde_json::json;

use crate::{
    common::error::AppError,
    handlers::{HandlerResult, Reply, RequestCtx},
    middleware::auth::bearer_token,
    models::auth::{ForgotPasswordPayload, LoginPayload, LoginResponse, ResetPasswordPayload},
    services::auth::LoginRejection,
};

// POST /auth/login
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login bem-sucedido", body = LoginResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 429, description = "Muitas tentativas")
    )
)]
pub async fn login(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: LoginPayload = ctx.parse()?;
    let audit = &ctx.state.audit;

    match ctx.state.auth_service.login(&payload.email, &payload.password).await {
        Ok(success) => {
            audit
                .record(
                    ctx.request_id,
                    Some(success.user.id),
                    "auth.login_success",
                    json!({ "user_id": success.user.id }),
                )
                .await;

            let response = LoginResponse {
                access_token: success.access_token,
                token_type: "Bearer".to_string(),
                expires_in: success.expires_in,
                user: success.user.profile(),
            };
            Ok(Reply::ok(json!(response)))
        }
        Err(LoginRejection::Blocked) => {
            audit
                .record(ctx.request_id, None, "auth.login_blocked", json!({}))
                .await;
            Err(AppError::TooManyAttempts)
        }
        Err(LoginRejection::BadCredentials { attempts, blocked }) => {
            audit
                .record(
                    ctx.request_id,
                    None,
                    "auth.login_failed",
                    json!({ "attempts": attempts, "blocked": blocked }),
                )
                .await;
            if blocked {
                Err(AppError::TooManyAttempts)
            } else {
                Err(AppError::InvalidCredentials)
            }
        }
        Err(LoginRejection::Failed(err)) => Err(err),
    }
}

// POST /auth/logout
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Sessão encerrada no cliente"))
)]
pub async fn logout(ctx: &RequestCtx<'_>) -> HandlerResult {
    // Tokens são stateless: só registramos quem saiu, se identificável.
    let actor = match bearer_token(ctx.headers) {
        Some(token) => ctx
            .state
            .auth_service
            .validate_token(token)
            .await
            .ok()
            .map(|u| u.id),
        None => None,
    };

    ctx.state
        .audit
        .record(ctx.request_id, actor, "auth.logout", json!({}))
        .await;
    Ok(Reply::ok(json!({ "status": "logged_out" })))
}

// POST /auth/forgot
#[utoipa::path(
    post,
    path = "/auth/forgot",
    tag = "Auth",
    request_body = ForgotPasswordPayload,
    responses((status = 200, description = "Pedido aceito (não revela se o e-mail existe)"))
)]
pub async fn forgot(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: ForgotPasswordPayload = ctx.parse()?;

    let mut body = json!({
        "status": "ok",
        "message": "Se o e-mail estiver cadastrado, enviaremos as instruções.",
    });

    if let Some((user, token)) = ctx.state.auth_service.forgot_password(&payload.email).await? {
        ctx.state
            .audit
            .record(
                ctx.request_id,
                Some(user.id),
                "auth.password_forgot",
                json!({ "user_id": user.id }),
            )
            .await;

        if ctx.state.config.debug_reset_token {
            body["reset_token"] = json!(token);
        }
    }

    Ok(Reply::ok(body))
}

// POST /auth/reset
#[utoipa::path(
    post,
    path = "/auth/reset",
    tag = "Auth",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Senha redefinida"),
        (status = 422, description = "Token inválido, usado ou expirado")
    )
)]
pub async fn reset(ctx: &RequestCtx<'_>) -> HandlerResult {
    let payload: ResetPasswordPayload = ctx.parse()?;
    let user = ctx
        .state
        .auth_service
        .reset_password(&payload.token, &payload.new_password)
        .await?;

    ctx.state
        .audit
        .record(
            ctx.request_id,
            Some(user.id),
            "auth.password_reset",
            json!({ "user_id": user.id }),
        )
        .await;
    Ok(Reply::ok(json!({ "status": "password_reset" })))
}
