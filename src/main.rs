use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codex_backend::app::Application;
use codex_backend::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so RUST_LOG and friends from the file apply to everything below
    let env_file = config::load_env_file();

    // Logging (stdout + tägliche Datei-Rotation unter ./logs)
    std::fs::create_dir_all("logs").ok();
    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let file_appender = tracing_appender::rolling::daily("logs", "codex-backend.log");
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Guards am Leben halten (nicht fallen lassen), damit Non-Blocking Writer korrekt flushen
    let _log_guards = (stdout_guard, file_guard);

    if let Some(path) = env_file {
        info!("Loaded environment from {}", path.display());
    }

    // embedded defaults -> codex.toml -> CODEX_CONFIG -> environment fallbacks
    let app_cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    info!(database = ?app_cfg.database, port = app_cfg.server.port, "configuration resolved");

    let app = match Application::build(app_cfg).await {
        Ok(app) => app,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return Err(e);
        }
    };

    app.run_until_stopped().await
}
