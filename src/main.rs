//src/main.rs

use assistencia_backend::{
    config::{Config, LogFormat},
    server,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // RUST_LOG sobrescreve o nível padrão.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => fmt().with_env_filter(filter).json().init(),
        LogFormat::Compact => fmt().with_env_filter(filter).with_target(false).compact().init(),
    }

    tracing::info!(
        service = %config.service_name,
        storage = ?config.storage,
        "Configuração carregada"
    );

    server::run(config).await
}
