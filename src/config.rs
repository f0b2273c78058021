// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;

use crate::{
    common::clock::{Clock, SystemClock},
    db::{
        DeliveryRepository, EquipmentRepository, ResetTokenRepository, SettingsRepository,
        SocialRepository, StorageBackend, StreetRepository, ThrottleRepository, UserRepository,
        VisitRepository,
    },
    services::{
        audit::{AuditRecorder, AuditSink, FileAuditSink, TracingAuditSink},
        auth::AuthService,
        export::PdfFonts,
        password::BcryptHasher,
        token::TokenService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Configuração resolvida uma única vez na inicialização.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub reset_token_ttl_secs: i64,
    pub throttle_window_secs: i64,
    pub throttle_max_attempts: usize,
    pub app_ready: bool,
    pub debug_reset_token: bool,
    pub storage: StorageBackend,
    pub audit_log_path: Option<PathBuf>,
    pub pdf_font_dir: PathBuf,
    pub bcrypt_cost: u32,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "assistencia_backend".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            jwt_secret: "dev-secret-change-me".to_string(),
            access_token_ttl_secs: 3600,
            reset_token_ttl_secs: 3600,
            throttle_window_secs: 900,
            throttle_max_attempts: 5,
            app_ready: true,
            debug_reset_token: false,
            storage: StorageBackend::Memory,
            audit_log_path: None,
            pdf_font_dir: PathBuf::from("./fonts"),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            log_format: LogFormat::Compact,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET não pode ser vazio");
        }

        let storage = match env_or("STORAGE_BACKEND", "memory").to_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "json" | "file" => StorageBackend::JsonFile {
                dir: PathBuf::from(env_or("DATA_DIR", "./data")),
            },
            other => anyhow::bail!("STORAGE_BACKEND desconhecido: {other}"),
        };

        let log_format = match env_or("LOG_FORMAT", "compact").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        Ok(Self {
            service_name: env_or("SERVICE_NAME", &defaults.service_name),
            bind_addr: env_or("BIND_ADDR", &defaults.bind_addr),
            jwt_secret,
            access_token_ttl_secs: env_parse("ACCESS_TOKEN_TTL_SECS", defaults.access_token_ttl_secs)?,
            reset_token_ttl_secs: env_parse("RESET_TOKEN_TTL_SECS", defaults.reset_token_ttl_secs)?,
            throttle_window_secs: env_parse("LOGIN_THROTTLE_WINDOW_SECS", defaults.throttle_window_secs)?,
            throttle_max_attempts: env_parse("LOGIN_THROTTLE_MAX_ATTEMPTS", defaults.throttle_max_attempts)?,
            app_ready: env_flag("APP_READY", true),
            debug_reset_token: env_flag("DEBUG_PASSWORD_RESET_TOKEN", false),
            storage,
            audit_log_path: env::var("AUDIT_LOG_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            pdf_font_dir: PathBuf::from(env_or("PDF_FONT_DIR", "./fonts")),
            bcrypt_cost: env_parse("BCRYPT_COST", defaults.bcrypt_cost)?,
            log_format,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} inválido ({raw}): {e}")),
        _ => Ok(default),
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
    pub user_repo: UserRepository,
    pub social_repo: SocialRepository,
    pub street_repo: StreetRepository,
    pub delivery_repo: DeliveryRepository,
    pub equipment_repo: EquipmentRepository,
    pub settings_repo: SettingsRepository,
    pub visit_repo: VisitRepository,
    pub auth_service: AuthService,
    pub audit: AuditRecorder,
    pub pdf_fonts: PdfFonts,
}

impl AppState {
    // Estado de produção: relógio do sistema e auditoria via tracing/arquivo.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let sink: Arc<dyn AuditSink> = match &config.audit_log_path {
            Some(path) => Arc::new(FileAuditSink::open(path).await?),
            None => Arc::new(TracingAuditSink),
        };
        Self::with_collaborators(config, Arc::new(SystemClock), sink).await
    }

    /// Monta o gráfico de dependências com relógio e sink injetados.
    pub async fn with_collaborators(
        config: Config,
        clock: Arc<dyn Clock>,
        audit_sink: Arc<dyn AuditSink>,
    ) -> anyhow::Result<Self> {
        let backend = &config.storage;
        let hasher = Arc::new(BcryptHasher::new(config.bcrypt_cost));

        let user_repo = UserRepository::open(backend, hasher)
            .await
            .context("falha ao abrir o store de usuários")?;
        let throttle_repo = ThrottleRepository::open(
            backend,
            config.throttle_window_secs,
            config.throttle_max_attempts,
        )
        .await?;
        let reset_token_repo = ResetTokenRepository::open(backend).await?;

        let purged = reset_token_repo.purge_expired(clock.timestamp()).await?;
        if purged > 0 {
            tracing::info!(purged, "Tokens de redefinição expirados removidos");
        }
        let purged = throttle_repo.purge_expired(clock.timestamp()).await?;
        if purged > 0 {
            tracing::info!(purged, "Falhas de login fora da janela removidas");
        }

        let audit = AuditRecorder::new(audit_sink, clock.clone());
        let token_service = TokenService::new(
            &config.jwt_secret,
            config.access_token_ttl_secs,
            clock.clone(),
        );
        let auth_service = AuthService::new(
            user_repo.clone(),
            throttle_repo,
            reset_token_repo,
            token_service,
            clock.clone(),
            config.reset_token_ttl_secs,
        );

        let pdf_fonts = PdfFonts::load(&config.pdf_font_dir)
            .context("falha ao carregar as fontes do PDF")?;

        let social_repo = SocialRepository::open(backend).await?;
        let street_repo = StreetRepository::open(backend).await?;
        let delivery_repo = DeliveryRepository::open(backend).await?;
        let equipment_repo = EquipmentRepository::open(backend).await?;
        let settings_repo = SettingsRepository::open(backend).await?;
        let visit_repo = VisitRepository::open(backend).await?;

        Ok(Self {
            config: Arc::new(config),
            clock,
            user_repo,
            social_repo,
            street_repo,
            delivery_repo,
            equipment_repo,
            settings_repo,
            visit_repo,
            auth_service,
            audit,
            pdf_fonts,
        })
    }
}
