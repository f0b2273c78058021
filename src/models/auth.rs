// src/models/auth.rs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::payload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Voluntario,
    Pastoral,
    Leitura,
}

impl Role {
    /// Papéis que podem alterar cadastros (famílias, rua, entregas, equipamentos).
    pub fn can_write(self) -> bool {
        matches!(self, Role::Admin | Role::Voluntario | Role::Pastoral)
    }
}

/// Permissões de um usuário: curinga (`*`) ou lista explícita.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum PermissionSet {
    Wildcard,
    Explicit(BTreeSet<String>),
}

impl PermissionSet {
    pub fn explicit(slugs: &[&str]) -> Self {
        PermissionSet::Explicit(slugs.iter().map(|s| s.to_string()).collect())
    }

    pub fn allows(&self, permission: &str) -> bool {
        match self {
            PermissionSet::Wildcard => true,
            PermissionSet::Explicit(set) => set.contains(permission),
        }
    }
}

impl From<Vec<String>> for PermissionSet {
    fn from(slugs: Vec<String>) -> Self {
        if slugs.iter().any(|s| s == "*") {
            PermissionSet::Wildcard
        } else {
            PermissionSet::Explicit(slugs.into_iter().collect())
        }
    }
}

impl From<PermissionSet> for Vec<String> {
    fn from(set: PermissionSet) -> Self {
        match set {
            PermissionSet::Wildcard => vec!["*".to_string()],
            PermissionSet::Explicit(slugs) => slugs.into_iter().collect(),
        }
    }
}

// Registro completo do store de credenciais (inclui o hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub permissions: PermissionSet,
}

impl User {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.allows(permission)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            permissions: self.permissions.clone().into(),
        }
    }
}

// O que o cliente pode ver sobre um usuário.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub permissions: Vec<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[serde(default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, message = "O e-mail é obrigatório."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordPayload {
    #[serde(default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, message = "O e-mail é obrigatório."))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordPayload {
    #[serde(default, deserialize_with = "payload::trimmed")]
    #[validate(length(min = 1, message = "O token é obrigatório."))]
    pub token: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub new_password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (e-mail do usuário)
    pub iat: i64,    // Issued At
    pub exp: i64,    // Expiration time
}
