// src/db/user_repo.rs

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    common::error::AppError,
    db::snapshot::{Snapshot, StorageBackend},
    models::auth::{PermissionSet, Role, User},
    services::password::PasswordHasher,
};

const OPERATOR_PERMISSIONS: &[&str] = &[
    "families.read",
    "street.read",
    "deliveries.read",
    "equipment.read",
    "reports.read",
    "settings.read",
    "settings.write",
    "eligibility.check",
    "visits.read",
    "visits.write",
];

const READER_PERMISSIONS: &[&str] = &[
    "families.read",
    "street.read",
    "deliveries.read",
    "equipment.read",
    "reports.read",
    "settings.read",
    "visits.read",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserState {
    users: BTreeMap<u64, User>,
}

// Store de credenciais. Só muda via redefinição de senha.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<Snapshot<UserState>>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserRepository {
    pub async fn open(
        backend: &StorageBackend,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, AppError> {
        let state = match Snapshot::<UserState>::restore(backend, "users").await? {
            Some(state) => state,
            None => bootstrap(hasher.as_ref()).await?,
        };

        Ok(Self {
            store: Arc::new(Snapshot::with_state(backend, "users", state).await?),
            hasher,
        })
    }

    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let email = normalize_email(email);
        self.store
            .read(|s| s.users.values().find(|u| u.email == email).cloned())
            .await
    }

    /// Retorna o usuário quando e-mail e senha conferem.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        let Some(user) = self.find_by_email(email).await else {
            return Ok(None);
        };

        if self.hasher.verify(password, &user.password_hash).await? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Troca a senha; `false` se o e-mail não existe mais.
    pub async fn reset_password(&self, email: &str, new_password: &str) -> Result<bool, AppError> {
        let email = normalize_email(email);
        let new_hash = self.hasher.hash(new_password).await?;

        self.store
            .write(|s| {
                match s.users.values_mut().find(|u| u.email == email) {
                    Some(user) => {
                        user.password_hash = new_hash;
                        Ok::<_, AppError>(true)
                    }
                    None => Ok(false),
                }
            })
            .await
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn bootstrap(hasher: &dyn PasswordHasher) -> Result<UserState, AppError> {
    let seeds = [
        (1, "Administrador", "admin@local", "admin123", Role::Admin, PermissionSet::Wildcard),
        (
            2,
            "Operador",
            "operador@local",
            "operador123",
            Role::Voluntario,
            PermissionSet::explicit(OPERATOR_PERMISSIONS),
        ),
        (
            3,
            "Pastoral",
            "pastoral@local",
            "pastoral123",
            Role::Pastoral,
            PermissionSet::explicit(OPERATOR_PERMISSIONS),
        ),
        (
            4,
            "Leitura",
            "leitura@local",
            "leitura123",
            Role::Leitura,
            PermissionSet::explicit(READER_PERMISSIONS),
        ),
    ];

    let mut users = BTreeMap::new();
    for (id, name, email, password, role, permissions) in seeds {
        let password_hash = hasher.hash(password).await?;
        users.insert(
            id,
            User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role,
                permissions,
            },
        );
    }

    tracing::info!(count = users.len(), "Usuários iniciais criados");
    Ok(UserState { users })
}
