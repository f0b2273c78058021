// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::Arc;

use assistencia_backend::{
    common::clock::ManualClock,
    config::{AppState, Config},
    db::StorageBackend,
    kernel::{Kernel, KernelResponse},
    services::audit::MemoryAuditSink,
};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use serde_json::{json, Value};

// 2024-03-15 12:00:00 UTC
pub const START: i64 = 1_710_504_000;

pub const ADMIN: (&str, &str) = ("admin@local", "admin123");
pub const OPERATOR: (&str, &str) = ("operador@local", "operador123");
pub const PASTORAL: (&str, &str) = ("pastoral@local", "pastoral123");
pub const READER: (&str, &str) = ("leitura@local", "leitura123");

pub const VALID_CPF: &str = "529.982.247-25";
pub const OTHER_CPF: &str = "111.444.777-35";
pub const THIRD_CPF: &str = "123.456.789-09";

pub struct TestApp {
    pub kernel: Kernel,
    pub clock: Arc<ManualClock>,
    pub audit: Arc<MemoryAuditSink>,
}

pub fn test_config() -> Config {
    Config {
        jwt_secret: "test-secret".to_string(),
        bcrypt_cost: 4,
        throttle_max_attempts: 3,
        pdf_font_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/fonts").into(),
        ..Config::default()
    }
}

pub async fn app() -> TestApp {
    app_with(test_config()).await
}

pub async fn app_on(backend: StorageBackend) -> TestApp {
    app_with(Config {
        storage: backend,
        ..test_config()
    })
    .await
}

pub async fn app_with(config: Config) -> TestApp {
    let clock = Arc::new(ManualClock::at_timestamp(START));
    let audit = Arc::new(MemoryAuditSink::default());
    let state = AppState::with_collaborators(config, clock.clone(), audit.clone())
        .await
        .expect("estado de teste");

    TestApp {
        kernel: Kernel::new(state),
        clock,
        audit,
    }
}

impl TestApp {
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        payload: Value,
    ) -> KernelResponse {
        self.call_with_id(method, path, token, payload, "req-test").await
    }

    pub async fn call_with_id(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        payload: Value,
        request_id: &str,
    ) -> KernelResponse {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            headers.insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
            );
        }
        self.kernel
            .handle(&method, path, request_id, &headers, &payload)
            .await
    }

    pub async fn get(&self, path: &str, token: &str) -> KernelResponse {
        self.call(Method::GET, path, Some(token), Value::Null).await
    }

    pub async fn post(&self, path: &str, token: &str, payload: Value) -> KernelResponse {
        self.call(Method::POST, path, Some(token), payload).await
    }

    pub async fn put(&self, path: &str, token: &str, payload: Value) -> KernelResponse {
        self.call(Method::PUT, path, Some(token), payload).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> KernelResponse {
        self.call(Method::DELETE, path, Some(token), Value::Null).await
    }

    pub async fn login(&self, (email, password): (&str, &str)) -> String {
        let res = self
            .call(
                Method::POST,
                "/auth/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login de {email}: {:?}", res.body);
        res.json()["access_token"]
            .as_str()
            .expect("access_token")
            .to_string()
    }

    pub async fn create_family(&self, token: &str, name: &str, cpf: &str) -> u64 {
        let res = self
            .post(
                "/families",
                token,
                json!({ "responsible_full_name": name, "responsible_cpf": cpf }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        item_id(&res)
    }

    pub async fn create_event(&self, token: &str, name: &str, date: &str) -> u64 {
        let res = self
            .post(
                "/deliveries/events",
                token,
                json!({ "name": name, "event_date": date }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        item_id(&res)
    }

    pub fn actions(&self) -> Vec<String> {
        self.audit.actions()
    }

    pub fn count_action(&self, action: &str) -> usize {
        self.actions().iter().filter(|a| a.as_str() == action).count()
    }
}

pub fn item_id(res: &KernelResponse) -> u64 {
    res.json()["item"]["id"].as_u64().expect("item.id")
}

pub fn error_code(res: &KernelResponse) -> &str {
    res.json()["error"].as_str().unwrap_or_default()
}
