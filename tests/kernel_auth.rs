mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use serde_json::{json, Value};

use assistencia_backend::config::Config;
use common::*;

async fn try_login(app: &TestApp, email: &str, password: &str) -> (StatusCode, String) {
    let res = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            json!({ "email": email, "password": password }),
        )
        .await;
    (res.status, error_code(&res).to_string())
}

#[tokio::test]
async fn login_returns_bearer_token_and_profile() {
    let app = app().await;
    let res = app
        .call_with_id(
            Method::POST,
            "/auth/login",
            None,
            json!({ "email": "  ADMIN@local ", "password": "admin123" }),
            "req-login-1",
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["request_id"], "req-login-1");
    assert_eq!(body["access_token"].as_str().unwrap().split('.').count(), 3);
    assert!(body["user"].get("password_hash").is_none());

    assert_eq!(app.actions(), vec!["auth.login_success"]);
    assert_eq!(app.audit.events()[0].actor, Some(1));
}

#[tokio::test]
async fn login_payload_is_validated() {
    let app = app().await;
    let res = app
        .call(Method::POST, "/auth/login", None, json!({ "email": "admin@local" }))
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&res), "invalid_payload");
    assert!(res.json()["details"]["password"].is_array());
}

#[tokio::test]
async fn repeated_failures_block_the_identity() {
    let app = app().await;

    assert_eq!(
        try_login(&app, "admin@local", "errada").await,
        (StatusCode::UNAUTHORIZED, "invalid_credentials".to_string())
    );
    assert_eq!(
        try_login(&app, "admin@local", "errada").await.0,
        StatusCode::UNAUTHORIZED
    );
    // A terceira falha atinge o limite configurado (3).
    assert_eq!(
        try_login(&app, "admin@local", "errada").await,
        (StatusCode::TOO_MANY_REQUESTS, "too_many_attempts".to_string())
    );
    // Bloqueado até para a senha certa.
    assert_eq!(
        try_login(&app, "admin@local", "admin123").await.0,
        StatusCode::TOO_MANY_REQUESTS
    );

    // Outra identidade não é afetada.
    assert_eq!(
        try_login(&app, "operador@local", "operador123").await.0,
        StatusCode::OK
    );

    assert_eq!(app.count_action("auth.login_failed"), 3);
    assert_eq!(app.count_action("auth.login_blocked"), 1);

    // Passada a janela, as falhas expiram.
    app.clock.advance(Duration::seconds(901));
    assert_eq!(
        try_login(&app, "admin@local", "admin123").await.0,
        StatusCode::OK
    );
}

#[tokio::test]
async fn successful_login_clears_previous_failures() {
    let app = app().await;

    try_login(&app, "admin@local", "errada").await;
    try_login(&app, "admin@local", "errada").await;
    assert_eq!(try_login(&app, "admin@local", "admin123").await.0, StatusCode::OK);

    // Contagem recomeça do zero.
    assert_eq!(
        try_login(&app, "admin@local", "errada").await.0,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        try_login(&app, "admin@local", "errada").await.0,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app().await;

    let res = app.call(Method::GET, "/families", None, Value::Null).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&res), "missing_token");
    assert_eq!(res.json()["request_id"], "req-test");

    let res = app.get("/families", "nao.e.jwt").await;
    assert_eq!(error_code(&res), "invalid_token");

    let token = app.login(ADMIN).await;
    let mut tampered = token.clone();
    tampered.push('x');
    assert_eq!(error_code(&app.get("/families", &tampered).await), "invalid_token");

    assert_eq!(app.get("/families", &token).await.status, StatusCode::OK);

    app.clock.advance(Duration::seconds(3600));
    let res = app.get("/families", &token).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&res), "invalid_token");
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let other = app_with(Config {
        jwt_secret: "outro-segredo".to_string(),
        ..test_config()
    })
    .await;
    let foreign = other.login(ADMIN).await;

    let app = app().await;
    assert_eq!(error_code(&app.get("/me", &foreign).await), "invalid_token");
}

#[tokio::test]
async fn me_returns_the_authenticated_profile() {
    let app = app().await;
    let token = app.login(READER).await;

    let res = app.get("/me", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["item"]["email"], "leitura@local");
    assert_eq!(res.json()["item"]["role"], "leitura");
}

#[tokio::test]
async fn permission_failures_are_forbidden_and_audited() {
    let app = app().await;
    let reader = app.login(READER).await;
    let admin = app.login(ADMIN).await;

    let res = app.get("/admin/ping", &reader).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&res), "forbidden");
    assert_eq!(app.count_action("auth.forbidden"), 1);

    let forbidden = app
        .audit
        .events()
        .into_iter()
        .find(|e| e.action == "auth.forbidden")
        .unwrap();
    assert_eq!(forbidden.actor, Some(4));
    assert_eq!(forbidden.context["route"], "/admin/ping");

    assert_eq!(app.get("/admin/ping", &admin).await.status, StatusCode::OK);
}

#[tokio::test]
async fn logout_is_stateless_and_audited() {
    let app = app().await;
    let token = app.login(OPERATOR).await;

    let res = app
        .call(Method::POST, "/auth/logout", Some(&token), Value::Null)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "logged_out");

    let event = app.audit.events().pop().unwrap();
    assert_eq!(event.action, "auth.logout");
    assert_eq!(event.actor, Some(2));

    // Sem estado no servidor: o token continua válido até expirar.
    assert_eq!(app.get("/me", &token).await.status, StatusCode::OK);

    let anonymous = app.call(Method::POST, "/auth/logout", None, Value::Null).await;
    assert_eq!(anonymous.status, StatusCode::OK);
}

#[tokio::test]
async fn forgot_and_reset_password_flow() {
    let app = app_with(Config {
        debug_reset_token: true,
        ..test_config()
    })
    .await;

    let res = app
        .call(Method::POST, "/auth/forgot", None, json!({ "email": "operador@local" }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "ok");
    let reset_token = res.json()["reset_token"].as_str().unwrap().to_string();

    let res = app
        .call(
            Method::POST,
            "/auth/reset",
            None,
            json!({ "token": reset_token, "new_password": "nova-senha" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "password_reset");

    assert_eq!(
        try_login(&app, "operador@local", "operador123").await.0,
        StatusCode::UNAUTHORIZED
    );
    app.login(("operador@local", "nova-senha")).await;

    // Uso único.
    let res = app
        .call(
            Method::POST,
            "/auth/reset",
            None,
            json!({ "token": reset_token, "new_password": "outra-senha" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&res), "invalid_reset_token");

    let actions = app.actions();
    assert!(actions.contains(&"auth.password_forgot".to_string()));
    assert!(actions.contains(&"auth.password_reset".to_string()));
}

#[tokio::test]
async fn reset_token_expires() {
    let app = app_with(Config {
        debug_reset_token: true,
        ..test_config()
    })
    .await;

    let res = app
        .call(Method::POST, "/auth/forgot", None, json!({ "email": "admin@local" }))
        .await;
    let reset_token = res.json()["reset_token"].as_str().unwrap().to_string();

    app.clock.advance(Duration::seconds(3601));
    let res = app
        .call(
            Method::POST,
            "/auth/reset",
            None,
            json!({ "token": reset_token, "new_password": "nova-senha" }),
        )
        .await;
    assert_eq!(error_code(&res), "invalid_reset_token");
    app.login(ADMIN).await;
}

#[tokio::test]
async fn forgot_does_not_reveal_accounts_or_tokens() {
    let app = app().await;

    let known = app
        .call(Method::POST, "/auth/forgot", None, json!({ "email": "admin@local" }))
        .await;
    let unknown = app
        .call(Method::POST, "/auth/forgot", None, json!({ "email": "ninguem@local" }))
        .await;

    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(known.json()["message"], unknown.json()["message"]);
    assert!(known.json().get("reset_token").is_none());
    assert_eq!(app.count_action("auth.password_forgot"), 1);
}

#[tokio::test]
async fn reset_requires_a_minimum_password_length() {
    let app = app().await;
    let res = app
        .call(
            Method::POST,
            "/auth/reset",
            None,
            json!({ "token": "qualquer", "new_password": "123" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&res), "invalid_payload");
}
