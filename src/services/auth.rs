// src/services/auth.rs

use std::sync::Arc;

use crate::{
    common::{clock::Clock, error::AppError},
    db::{user_repo::normalize_email, ResetTokenRepository, ThrottleRepository, UserRepository},
    models::auth::User,
    services::token::TokenService,
};

#[derive(Debug)]
pub struct LoginSuccess {
    pub user: User,
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug)]
pub enum LoginRejection {
    /// Identidade já bloqueada; a senha nem foi conferida.
    Blocked,
    /// Senha errada; `blocked` indica se esta falha atingiu o limite.
    BadCredentials { attempts: usize, blocked: bool },
    Failed(AppError),
}

impl From<AppError> for LoginRejection {
    fn from(err: AppError) -> Self {
        LoginRejection::Failed(err)
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    throttle_repo: ThrottleRepository,
    reset_token_repo: ResetTokenRepository,
    tokens: TokenService,
    clock: Arc<dyn Clock>,
    reset_ttl_secs: i64,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        throttle_repo: ThrottleRepository,
        reset_token_repo: ResetTokenRepository,
        tokens: TokenService,
        clock: Arc<dyn Clock>,
        reset_ttl_secs: i64,
    ) -> Self {
        Self {
            user_repo,
            throttle_repo,
            reset_token_repo,
            tokens,
            clock,
            reset_ttl_secs,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSuccess, LoginRejection> {
        let identity = normalize_email(email);
        let now = self.clock.timestamp();

        // 1. Bloqueado: recusa antes de verificar a senha
        if self.throttle_repo.is_blocked(&identity, now).await {
            return Err(LoginRejection::Blocked);
        }

        // 2. Confere as credenciais
        let Some(user) = self.user_repo.authenticate(&identity, password).await? else {
            let decision = self
                .throttle_repo
                .register_failure(&identity, now)
                .await
                .map_err(AppError::from)?;
            return Err(LoginRejection::BadCredentials {
                attempts: decision.attempts,
                blocked: decision.blocked,
            });
        };

        // 3. Sucesso zera as falhas e emite o token
        self.throttle_repo
            .clear(&identity)
            .await
            .map_err(AppError::from)?;
        let access_token = self.tokens.issue(&user.email)?;

        Ok(LoginSuccess {
            user,
            access_token,
            expires_in: self.tokens.ttl_secs(),
        })
    }

    /// Resolve o usuário dono de um bearer token.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.tokens.verify(token).ok_or(AppError::InvalidToken)?;

        self.user_repo
            .find_by_email(&claims.sub)
            .await
            .ok_or(AppError::UnknownUser)
    }

    /// Emite token de redefinição para e-mails conhecidos.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<(User, String)>, AppError> {
        let Some(user) = self.user_repo.find_by_email(email).await else {
            return Ok(None);
        };

        let token = self
            .reset_token_repo
            .issue(&user.email, self.clock.timestamp(), self.reset_ttl_secs)
            .await?;
        Ok(Some((user, token)))
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<User, AppError> {
        let email = self
            .reset_token_repo
            .consume(token, self.clock.timestamp())
            .await?
            .ok_or(AppError::InvalidResetToken)?;

        if !self.user_repo.reset_password(&email, new_password).await? {
            return Err(AppError::InvalidResetToken);
        }
        self.throttle_repo.clear(&email).await?;

        self.user_repo
            .find_by_email(&email)
            .await
            .ok_or(AppError::InvalidResetToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::clock::ManualClock, db::StorageBackend, services::password::BcryptHasher,
    };

    async fn service(clock: Arc<ManualClock>) -> AuthService {
        let backend = StorageBackend::Memory;
        let users = UserRepository::open(&backend, Arc::new(BcryptHasher::new(4)))
            .await
            .unwrap();
        AuthService::new(
            users,
            ThrottleRepository::open(&backend, 900, 5).await.unwrap(),
            ResetTokenRepository::open(&backend).await.unwrap(),
            TokenService::new("secret", 3600, clock.clone()),
            clock,
            3600,
        )
    }

    #[tokio::test]
    async fn blocked_identity_is_rejected_even_with_right_password() {
        let auth = service(Arc::new(ManualClock::at_timestamp(1_000))).await;

        for expected in 1..=4 {
            match auth.login("admin@local", "errada").await {
                Err(LoginRejection::BadCredentials { attempts, blocked }) => {
                    assert_eq!(attempts, expected);
                    assert!(!blocked);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(matches!(
            auth.login("admin@local", "errada").await,
            Err(LoginRejection::BadCredentials { blocked: true, .. })
        ));
        assert!(matches!(
            auth.login("admin@local", "admin123").await,
            Err(LoginRejection::Blocked)
        ));
    }

    #[tokio::test]
    async fn token_round_trip_resolves_user() {
        let clock = Arc::new(ManualClock::at_timestamp(1_000));
        let auth = service(clock.clone()).await;

        let ok = auth.login("Operador@Local", "operador123").await.unwrap();
        assert_eq!(ok.expires_in, 3600);
        let user = auth.validate_token(&ok.access_token).await.unwrap();
        assert_eq!(user.email, "operador@local");

        clock.advance(chrono::Duration::seconds(3600));
        assert!(matches!(
            auth.validate_token(&ok.access_token).await,
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn token_for_missing_user_is_unknown_user() {
        let auth = service(Arc::new(ManualClock::at_timestamp(1_000))).await;
        let token = crate::services::token::issue_token("ninguem@local", "secret", 60, 1_000).unwrap();
        assert!(matches!(
            auth.validate_token(&token).await,
            Err(AppError::UnknownUser)
        ));
    }

    #[tokio::test]
    async fn reset_flow_changes_password_and_expires() {
        let clock = Arc::new(ManualClock::at_timestamp(1_000));
        let auth = service(clock.clone()).await;

        assert!(auth.forgot_password("ninguem@local").await.unwrap().is_none());

        let (_, token) = auth.forgot_password("admin@local").await.unwrap().unwrap();
        auth.reset_password(&token, "nova-senha").await.unwrap();
        assert!(auth.login("admin@local", "admin123").await.is_err());
        assert!(auth.login("admin@local", "nova-senha").await.is_ok());

        let (_, stale) = auth.forgot_password("admin@local").await.unwrap().unwrap();
        clock.advance(chrono::Duration::seconds(5_000));
        assert!(matches!(
            auth.reset_password(&stale, "outra-senha").await,
            Err(AppError::InvalidResetToken)
        ));
    }
}
