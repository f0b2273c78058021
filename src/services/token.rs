// src/services/token.rs

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::{clock::Clock, error::AppError},
    models::auth::Claims,
};

/// Emite um JWT HS256 com `{sub, iat, exp}`.
pub fn issue_token(subject: &str, secret: &str, ttl_secs: i64, now: i64) -> Result<String, AppError> {
    let claims = Claims {
        sub: subject.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Verifica assinatura e expiração; qualquer falha vira `None`.
pub fn verify_token(token: &str, secret: &str, now: i64) -> Option<Claims> {
    verify_with(token, &DecodingKey::from_secret(secret.as_bytes()), now)
}

fn verify_with(token: &str, key: &DecodingKey, now: i64) -> Option<Claims> {
    // A expiração é checada abaixo contra o relógio injetado, sem leeway.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.required_spec_claims = ["exp", "sub"].into_iter().map(String::from).collect();

    let data = decode::<Claims>(token.trim(), key, &validation).ok()?;
    if now >= data.claims.exp {
        return None;
    }
    Some(data.claims)
}

#[derive(Clone)]
pub struct TokenService {
    secret: Arc<str>,
    decoding: DecodingKey,
    ttl_secs: i64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Arc::from(secret),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            clock,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// O `sub` é o e-mail normalizado do usuário.
    pub fn issue(&self, email: &str) -> Result<String, AppError> {
        issue_token(email, &self.secret, self.ttl_secs, self.clock.timestamp())
    }

    pub fn verify(&self, token: &str) -> Option<Claims> {
        verify_with(token, &self.decoding, self.clock.timestamp())
    }
}
